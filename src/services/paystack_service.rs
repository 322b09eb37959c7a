// services/paystack_service.rs
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde_json::Value;
use tracing::{error, info};

use crate::config::{AppConfig, GATEWAY_TIMEOUT};
use crate::errors::GatewayError;
use crate::models::paystack::{InitializeEnvelope, InitializeRequest, Initialized, Verification};
use crate::services::gateway::PaymentGateway;

#[derive(Debug, Clone)]
pub struct PaystackService {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl PaystackService {
    pub fn new(config: &AppConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(GATEWAY_TIMEOUT).build()?;

        Ok(PaystackService {
            client,
            secret_key: config.paystack_secret_key.clone(),
            base_url: config.paystack_base_url.clone(),
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    async fn read_json(response: Response) -> Result<Value, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Paystack returned {} - {}", status, body);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for PaystackService {
    async fn initialize(&self, request: InitializeRequest) -> Result<Initialized, GatewayError> {
        info!(
            "Paystack: initializing {} for {} ({} {})",
            request.reference, request.email, request.amount, request.currency
        );

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .header(header::AUTHORIZATION, self.bearer())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let body = Self::read_json(response).await?;
        let envelope: InitializeEnvelope = serde_json::from_value(body)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        if !envelope.status {
            let message = envelope.message.unwrap_or_else(|| "Unknown error".to_string());
            return Err(GatewayError::Rejected(message));
        }

        let data = envelope
            .data
            .ok_or_else(|| GatewayError::MalformedResponse("missing data.authorization_url".to_string()))?;

        info!("Paystack: checkout ready for {}", request.reference);
        Ok(Initialized {
            authorization_url: data.authorization_url,
            gateway_reference: data.reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<Verification, GatewayError> {
        info!("Paystack: verifying {}", reference);

        let response = self
            .client
            .get(format!("{}/transaction/verify/{}", self.base_url, reference))
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;

        let body = Self::read_json(response).await?;
        Verification::from_raw(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
    }
}
