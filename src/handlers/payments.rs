// handlers/payments.rs
use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::{
    errors::{AppError, Result},
    models::transaction::TransactionStatus,
    state::AppState,
    views,
};

/// Raw form fields. Both are parsed by hand so that a blank or non-numeric
/// amount is a 400 rather than an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct InitiatePaymentForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub amount: String,
}

/// `reference` is ours; `trxref` is the name the gateway appends on redirect.
#[derive(Debug, Default, Deserialize)]
pub struct ReferenceQuery {
    pub reference: Option<String>,
    pub trxref: Option<String>,
}

impl ReferenceQuery {
    pub fn resolve(&self) -> Option<&str> {
        [self.reference.as_deref(), self.trxref.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|r| !r.is_empty())
    }
}

pub async fn initiate_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: std::result::Result<Form<InitiatePaymentForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form.map_err(|rejection| AppError::invalid_request(rejection.body_text()))?;

    if form.email.trim().is_empty() || form.amount.trim().is_empty() {
        return Err(AppError::invalid_request("Email and amount are required"));
    }

    let amount: i64 = form
        .amount
        .trim()
        .parse()
        .map_err(|_| {
            AppError::invalid_request(format!("Amount must be a whole number of kobo, got {:?}", form.amount))
        })?;

    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    let base_url = state.config.callback_base_url(host);

    let checkout = state.payments.initiate(&form.email, amount, &base_url).await?;
    info!("Redirecting {} to gateway checkout", checkout.transaction.reference);

    Ok((StatusCode::FOUND, [(header::LOCATION, checkout.authorization_url)]).into_response())
}

pub async fn payment_success(
    State(state): State<AppState>,
    Query(query): Query<ReferenceQuery>,
) -> Html<String> {
    match state.verification.verify_and_update(query.resolve()).await {
        Ok(transaction) if transaction.status == TransactionStatus::Success => views::success(&transaction),
        Ok(transaction) => views::failed(&format!("Payment {}", transaction.status), Some(&transaction)),
        Err(AppError::MissingReference) => views::failed("Transaction reference not provided", None),
        Err(AppError::TransactionNotFound(_)) => views::failed("Transaction not found", None),
        Err(e) => {
            error!("Payment success handling error: {}", e);
            views::failed(&format!("Error processing payment: {}", e), None)
        }
    }
}

pub async fn payment_failed(
    State(state): State<AppState>,
    Query(query): Query<ReferenceQuery>,
) -> Response {
    let transaction = match query.resolve() {
        Some(reference) => match state.store.find_by_reference(reference).await {
            Ok(found) => found,
            Err(e) => return AppError::from(e).into_response(),
        },
        None => None,
    };

    views::failed("Payment was not successful", transaction.as_ref()).into_response()
}
