// handlers/webhook.rs
use axum::{body::Bytes, extract::State, response::Json};
use serde_json::{json, Value};

use crate::{errors::Result, state::AppState};

/// Always acknowledges a parseable delivery, matched or not, so the gateway
/// does not keep redelivering events this service cannot act on.
pub async fn paystack_webhook(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let outcome = state.verification.handle_webhook(&body).await?;
    tracing::debug!("Webhook outcome: {:?}", outcome);

    Ok(Json(json!({
        "status": "success",
        "message": "Webhook processed",
    })))
}
