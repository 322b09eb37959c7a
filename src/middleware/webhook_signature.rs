use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::errors::AppError;
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Webhook bodies are small; anything larger is not from the gateway.
const MAX_WEBHOOK_BODY: usize = 1024 * 1024;

type HmacSha512 = Hmac<Sha512>;

/// Checks `signature`, the lowercase hex HMAC-SHA512 of `body` keyed by the
/// gateway secret.
pub fn verify(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

pub async fn webhook_signature_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.verify_webhook_signature {
        return next.run(request).await;
    }

    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
    else {
        tracing::warn!("Webhook rejected: missing {}", SIGNATURE_HEADER);
        return AppError::InvalidSignature.into_response();
    };

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_WEBHOOK_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => return AppError::invalid_payload(e.to_string()).into_response(),
    };

    if !verify(&state.config.paystack_secret_key, &bytes, &signature) {
        tracing::warn!("Webhook rejected: signature mismatch");
        return AppError::InvalidSignature.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
