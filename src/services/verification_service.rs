// services/verification_service.rs
//! Reconciliation of transaction status from gateway signals.
//!
//! Two independent signals converge here: a verify call triggered by the
//! browser redirect, and the gateway's webhook push. Both are applied as a
//! full overwrite of `status`, `gateway_reference` and `gateway_response`,
//! so replaying a signal is a no-op and the last signal written wins.
//!
//! The redirect and the webhook for the same reference can race. Writes go
//! through the store's compare-and-swap, and a stale write re-reads the
//! record and re-applies the signal it already holds. The gateway is never
//! called twice for one reconciliation.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::database::transaction_store::TransactionStore;
use crate::errors::{AppError, Result, StoreError};
use crate::models::paystack::{ChargeEvent, Verification, WebhookEnvelope};
use crate::models::transaction::{Transaction, TransactionStatus};
use crate::services::gateway::PaymentGateway;

const MAX_WRITE_ATTEMPTS: usize = 3;

/// A decided outcome, ready to be written onto a transaction.
#[derive(Debug, Clone, PartialEq)]
enum Resolution {
    /// Verification could not be trusted: the call failed or the gateway
    /// said `status: false`. The transaction fails; its gateway reference is
    /// left as it was.
    Unverified { detail: String },
    /// The gateway reported a concrete outcome.
    Settled {
        status: TransactionStatus,
        gateway_reference: Option<String>,
        gateway_response: String,
    },
}

impl Resolution {
    fn from_verification(verification: &Verification) -> Self {
        let raw = verification.raw.to_string();
        if !verification.status {
            return Resolution::Unverified { detail: raw };
        }

        let status = TransactionStatus::from_gateway(verification.data.status.as_deref().unwrap_or_default());
        Resolution::Settled {
            status,
            gateway_reference: verification.data.reference.clone(),
            gateway_response: raw,
        }
    }

    fn from_webhook(event: ChargeEvent, envelope: &WebhookEnvelope) -> Self {
        let status = match event {
            ChargeEvent::Success => TransactionStatus::Success,
            ChargeEvent::Failed => TransactionStatus::Failed,
        };
        Resolution::Settled {
            status,
            gateway_reference: envelope.gateway_reference(),
            gateway_response: envelope.data.to_string(),
        }
    }

    fn apply_to(&self, transaction: &mut Transaction) {
        match self {
            Resolution::Unverified { detail } => {
                transaction.status = TransactionStatus::Failed;
                transaction.gateway_response = Some(detail.clone());
            }
            Resolution::Settled {
                status,
                gateway_reference,
                gateway_response,
            } => {
                transaction.status = *status;
                transaction.gateway_reference = gateway_reference.clone();
                transaction.gateway_response = Some(gateway_response.clone());
            }
        }
    }
}

/// What a webhook delivery did. Every variant is acknowledged to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Applied(Transaction),
    IgnoredEvent(Option<String>),
    MissingReference,
    UnknownReference(String),
}

#[derive(Clone)]
pub struct VerificationService {
    store: Arc<dyn TransactionStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl VerificationService {
    pub fn new(store: Arc<dyn TransactionStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        VerificationService { store, gateway }
    }

    /// Verify-driven reconciliation (browser redirect or explicit check).
    ///
    /// Gateway failures are absorbed into a `failed` transaction; only a
    /// missing reference, an unknown reference, or a storage failure is
    /// returned as an error.
    pub async fn verify_and_update(&self, reference: Option<&str>) -> Result<Transaction> {
        let reference = match reference.map(str::trim) {
            Some(r) if !r.is_empty() => r,
            _ => return Err(AppError::MissingReference),
        };

        let transaction = self
            .store
            .find_by_reference(reference)
            .await?
            .ok_or_else(|| AppError::TransactionNotFound(reference.to_string()))?;

        let resolution = match self.gateway.verify(reference).await {
            Ok(verification) => {
                if !verification.status {
                    warn!(
                        "Verification of {} rejected by gateway: {}",
                        reference,
                        verification.message.as_deref().unwrap_or("no message")
                    );
                }
                Resolution::from_verification(&verification)
            }
            Err(e) => {
                warn!("Verification of {} failed: {}", reference, e);
                Resolution::Unverified {
                    detail: format!("Verification error: {}", e),
                }
            }
        };

        let updated = self.persist(transaction, &resolution).await?;
        info!("Transaction {} reconciled to {}", updated.reference, updated.status);
        Ok(updated)
    }

    /// Webhook-driven reconciliation. Only a body that does not parse as an
    /// `{event, data}` envelope is an error; everything else is acknowledged,
    /// whether or not it changed anything.
    pub async fn handle_webhook(&self, body: &[u8]) -> Result<WebhookOutcome> {
        let envelope: WebhookEnvelope = serde_json::from_slice(body).map_err(|e| {
            warn!("Invalid JSON in webhook payload: {}", e);
            AppError::invalid_payload(e.to_string())
        })?;

        info!("Received Paystack webhook: {}", envelope.event_name().unwrap_or("<none>"));

        let Some(event) = envelope.charge_event() else {
            debug!("Ignoring webhook event {:?}", envelope.event);
            return Ok(WebhookOutcome::IgnoredEvent(envelope.event_name().map(String::from)));
        };

        let Some(reference) = envelope.reference() else {
            warn!("Webhook {:?} carried no reference", envelope.event_name());
            return Ok(WebhookOutcome::MissingReference);
        };

        let Some(transaction) = self.store.find_by_reference(reference).await? else {
            info!("Webhook for unknown reference {}, acknowledging", reference);
            return Ok(WebhookOutcome::UnknownReference(reference.to_string()));
        };

        let resolution = Resolution::from_webhook(event, &envelope);
        let updated = self.persist(transaction, &resolution).await?;
        info!("Updated transaction {} to {}", updated.reference, updated.status);
        Ok(WebhookOutcome::Applied(updated))
    }

    async fn persist(&self, mut transaction: Transaction, resolution: &Resolution) -> Result<Transaction> {
        let reference = transaction.reference.clone();

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            resolution.apply_to(&mut transaction);
            match self.store.update(&transaction).await {
                Ok(written) => return Ok(written),
                Err(StoreError::Conflict(_)) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!("Concurrent update on {}, retrying (attempt {})", reference, attempt);
                    transaction = self
                        .store
                        .find_by_reference(&reference)
                        .await?
                        .ok_or_else(|| AppError::TransactionNotFound(reference.clone()))?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::Conflict(reference).into())
    }
}
