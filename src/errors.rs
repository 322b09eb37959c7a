// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of a single outbound call to the payment gateway.
///
/// Callers must treat every variant as "the call did not happen"; there is
/// no partial success.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("gateway rejected request: {0}")]
    Rejected(String),

    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate transaction reference: {0}")]
    DuplicateReference(String),

    #[error("transaction {0} was modified concurrently")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transaction reference not provided")]
    MissingReference,

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Duplicate transaction reference: {0}")]
    DuplicateReference(String),

    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateReference(reference) => AppError::DuplicateReference(reference),
            other => AppError::Store(other),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
            AppError::MissingReference => (StatusCode::BAD_REQUEST, "Missing reference"),
            AppError::TransactionNotFound(_) => (StatusCode::NOT_FOUND, "Transaction not found"),
            AppError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "Invalid JSON payload"),
            AppError::InvalidSignature => (StatusCode::UNAUTHORIZED, "Invalid signature"),
            AppError::Gateway(_) => (StatusCode::BAD_REQUEST, "Payment initialization failed"),
            AppError::DuplicateReference(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::ConfigurationError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error")
            }
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl AppError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        AppError::InvalidRequest(msg.into())
    }

    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        AppError::InvalidPayload(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
