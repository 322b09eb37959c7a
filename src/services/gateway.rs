// services/gateway.rs
use async_trait::async_trait;

use crate::errors::GatewayError;
use crate::models::paystack::{InitializeRequest, Initialized, Verification};

/// The two operations this service needs from a hosted-checkout gateway.
///
/// Implementations make exactly one outbound call per method and never retry.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, request: InitializeRequest) -> Result<Initialized, GatewayError>;

    async fn verify(&self, reference: &str) -> Result<Verification, GatewayError>;
}
