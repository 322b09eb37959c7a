// services/payment_service.rs
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

use crate::config::SUCCESS_CALLBACK_PATH;
use crate::database::transaction_store::TransactionStore;
use crate::errors::{AppError, Result};
use crate::models::paystack::InitializeRequest;
use crate::models::transaction::{NewTransaction, Transaction};
use crate::services::gateway::PaymentGateway;
use crate::services::reference::generate_reference;

/// A started checkout: where to send the browser, and the pending record.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub authorization_url: String,
    pub transaction: Transaction,
}

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn TransactionStore>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl PaymentService {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
    ) -> Self {
        PaymentService {
            store,
            gateway,
            currency: currency.into(),
        }
    }

    /// Opens a pending transaction and asks the gateway for a hosted
    /// checkout.
    ///
    /// A reference collision is reported as an internal error and never
    /// retried. If the gateway call fails the pending record stays behind.
    pub async fn initiate(&self, email: &str, amount: i64, callback_base_url: &str) -> Result<Checkout> {
        let new = NewTransaction {
            email: email.trim().to_string(),
            amount,
            reference: generate_reference(),
        };
        new.validate()?;

        let transaction = self.store.create(Transaction::pending(new)).await?;
        info!(
            "Created pending transaction {} for {} ({} kobo)",
            transaction.reference, transaction.email, transaction.amount
        );

        let callback_url = format!("{}{}", callback_base_url.trim_end_matches('/'), SUCCESS_CALLBACK_PATH);
        let request = InitializeRequest {
            email: transaction.email.clone(),
            amount: transaction.amount,
            reference: transaction.reference.clone(),
            callback_url,
            currency: self.currency.clone(),
        };

        let initialized = self.gateway.initialize(request).await.map_err(|e| {
            error!("Payment initiation failed for {}: {}", transaction.reference, e);
            AppError::Gateway(e)
        })?;

        if let Some(echoed) = initialized.gateway_reference.as_deref() {
            if echoed != transaction.reference {
                warn!("Gateway echoed reference {} for {}", echoed, transaction.reference);
            }
        }

        Ok(Checkout {
            authorization_url: initialized.authorization_url,
            transaction,
        })
    }
}
