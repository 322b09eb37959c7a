use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::payments::{initiate_payment, payment_failed, payment_success};
use crate::state::AppState;

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        // POST /payments/initiate - form fields email, amount (kobo); 302 to checkout
        .route("/initiate", post(initiate_payment))
        // GET /payments/success?reference=... or ?trxref=... - gateway callback
        .route("/success", get(payment_success))
        .route("/failed", get(payment_failed))
}
