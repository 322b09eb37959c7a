use axum::{middleware, routing::post, Router};

use crate::handlers::webhook::paystack_webhook;
use crate::middleware::webhook_signature::webhook_signature_middleware;
use crate::state::AppState;

pub fn webhook_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/paystack", post(paystack_webhook))
        .route_layer(middleware::from_fn_with_state(state, webhook_signature_middleware))
}
