use axum::{extract::State, response::{Html, Json}};
use serde_json::{json, Value};

use crate::{state::AppState, views};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn home(State(state): State<AppState>) -> Html<String> {
    views::payment_form(&state.config.app_name)
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = if state.store.ping().await { "connected" } else { "disconnected" };

    Json(json!({
        "status": "ok",
        "service": state.config.app_name,
        "version": VERSION,
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn app_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "app_name": state.config.app_name,
        "version": VERSION,
        "description": "Payment service with Paystack integration",
        "environment": state.config.environment,
        "endpoints": {
            "home": "/",
            "health": "/health",
            "payment_form": "/",
            "initiate_payment": "/payments/initiate",
            "payment_success": "/payments/success",
            "payment_failed": "/payments/failed",
            "webhook": "/webhook/paystack",
        },
        "features": [
            "Paystack payment integration",
            "Transaction verification",
            "Webhook handling",
            "MongoDB transaction storage",
            "Async endpoints",
        ],
    }))
}
