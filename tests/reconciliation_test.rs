mod common;

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use common::{success_verification, StubGateway, TestApp, VerifyStub};
use payment_service::{
    database::transaction_store::{InMemoryTransactionStore, TransactionStore},
    errors::{AppError, StoreError},
    models::transaction::{NewTransaction, Transaction, TransactionStatus},
    services::verification_service::{VerificationService, WebhookOutcome},
};

const REF: &str = "PAY_1700000000_a1b2c3d4";

fn webhook(event: &str, reference: Option<&str>) -> Vec<u8> {
    let data = match reference {
        Some(r) => json!({ "reference": r, "paystack_reference": "T685312322", "amount": 50000 }),
        None => json!({ "amount": 50000 }),
    };
    serde_json::to_vec(&json!({ "event": event, "data": data })).unwrap()
}

// ---- verify path ----

#[tokio::test]
async fn missing_reference_touches_nothing() {
    let app = TestApp::new();

    for reference in [None, Some(""), Some("   ")] {
        let err = app.state.verification.verify_and_update(reference).await.unwrap_err();
        assert!(matches!(err, AppError::MissingReference));
    }

    assert_eq!(app.store.calls(), 0);
    assert_eq!(app.gateway.verify_count(), 0);
}

#[tokio::test]
async fn unknown_reference_is_not_found_and_gateway_is_not_called() {
    let app = TestApp::new();

    let err = app.state.verification.verify_and_update(Some(REF)).await.unwrap_err();
    assert!(matches!(err, AppError::TransactionNotFound(ref r) if r == REF));
    assert_eq!(app.gateway.verify_count(), 0);
}

#[tokio::test]
async fn successful_verification_settles_transaction() {
    let app = TestApp::new();
    app.seed_pending(REF).await;

    let tx = app.state.verification.verify_and_update(Some(REF)).await.unwrap();

    assert_eq!(tx.status, TransactionStatus::Success);
    assert_eq!(tx.gateway_reference.as_deref(), Some("GWREF"));
    let raw: serde_json::Value = serde_json::from_str(tx.gateway_response.as_deref().unwrap()).unwrap();
    assert_eq!(raw, success_verification("GWREF"));
    assert_eq!(app.fetch(REF).await.unwrap(), tx);
}

#[tokio::test]
async fn nested_status_mapping() {
    for (gateway_status, expected) in [
        ("failed", TransactionStatus::Failed),
        ("abandoned", TransactionStatus::Pending),
        ("ongoing", TransactionStatus::Pending),
    ] {
        let app = TestApp::new();
        app.seed_pending(REF).await;
        app.gateway.set_verify(VerifyStub::Body(json!({
            "status": true,
            "data": { "status": gateway_status, "reference": "GW9" }
        })));

        let tx = app.state.verification.verify_and_update(Some(REF)).await.unwrap();
        assert_eq!(tx.status, expected, "gateway status {gateway_status}");
        assert_eq!(tx.gateway_reference.as_deref(), Some("GW9"));
    }
}

#[tokio::test]
async fn gateway_status_false_fails_transaction_with_raw_response() {
    let app = TestApp::new();
    app.seed_pending(REF).await;
    app.gateway.set_verify(VerifyStub::Body(json!({
        "status": false,
        "message": "Transaction reference not found"
    })));

    let tx = app.state.verification.verify_and_update(Some(REF)).await.unwrap();

    assert_eq!(tx.status, TransactionStatus::Failed);
    assert!(tx.gateway_response.unwrap().contains("Transaction reference not found"));
    assert!(tx.gateway_reference.is_none());
}

#[tokio::test]
async fn gateway_error_is_absorbed_into_failed_status() {
    for stub in [VerifyStub::HttpStatus(502), VerifyStub::Malformed] {
        let app = TestApp::new();
        app.seed_pending(REF).await;
        app.gateway.set_verify(stub);

        let tx = app.state.verification.verify_and_update(Some(REF)).await.unwrap();

        assert_eq!(tx.status, TransactionStatus::Failed);
        let detail = tx.gateway_response.unwrap();
        assert!(detail.starts_with("Verification error:"), "got {detail}");
        assert_eq!(app.fetch(REF).await.unwrap().status, TransactionStatus::Failed);
    }
}

#[tokio::test]
async fn repeated_verification_is_idempotent() {
    let app = TestApp::new();
    app.seed_pending(REF).await;

    let first = app.state.verification.verify_and_update(Some(REF)).await.unwrap();
    let second = app.state.verification.verify_and_update(Some(REF)).await.unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(first.gateway_reference, second.gateway_reference);
    assert_eq!(first.gateway_response, second.gateway_response);
    assert_eq!(app.store.inner.len().await, 1);
}

// ---- webhook path ----

#[tokio::test]
async fn charge_success_webhook_settles_and_replay_is_idempotent() {
    let app = TestApp::new();
    app.seed_pending(REF).await;
    let body = webhook("charge.success", Some(REF));

    let outcome = app.state.verification.handle_webhook(&body).await.unwrap();
    let WebhookOutcome::Applied(tx) = outcome else {
        panic!("expected the webhook to be applied");
    };
    assert_eq!(tx.status, TransactionStatus::Success);
    assert_eq!(tx.gateway_reference.as_deref(), Some("T685312322"));

    app.state.verification.handle_webhook(&body).await.unwrap();
    let replayed = app.fetch(REF).await.unwrap();
    assert_eq!(replayed.status, TransactionStatus::Success);
    assert_eq!(replayed.gateway_reference, tx.gateway_reference);
    assert_eq!(replayed.gateway_response, tx.gateway_response);
    assert_eq!(app.store.inner.len().await, 1);
}

#[tokio::test]
async fn charge_failed_webhook_fails_transaction() {
    let app = TestApp::new();
    app.seed_pending(REF).await;

    app.state
        .verification
        .handle_webhook(&webhook("charge.failed", Some(REF)))
        .await
        .unwrap();

    let tx = app.fetch(REF).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Failed);
    let stored: serde_json::Value = serde_json::from_str(tx.gateway_response.as_deref().unwrap()).unwrap();
    assert_eq!(stored["reference"], REF);
}

#[tokio::test]
async fn unknown_reference_is_acknowledged_without_writes() {
    let app = TestApp::new();

    let outcome = app
        .state
        .verification
        .handle_webhook(&webhook("charge.success", Some("PAY_1_ffffffff")))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::UnknownReference("PAY_1_ffffffff".to_string()));
    assert!(app.store.inner.is_empty().await);
}

#[tokio::test]
async fn unrecognised_event_and_missing_reference_are_noops() {
    let app = TestApp::new();
    let before = app.seed_pending(REF).await;

    let ignored = app
        .state
        .verification
        .handle_webhook(&webhook("transfer.success", Some(REF)))
        .await
        .unwrap();
    assert_eq!(ignored, WebhookOutcome::IgnoredEvent(Some("transfer.success".to_string())));

    let missing = app
        .state
        .verification
        .handle_webhook(&webhook("charge.success", None))
        .await
        .unwrap();
    assert_eq!(missing, WebhookOutcome::MissingReference);

    let empty = app.state.verification.handle_webhook(b"{}").await.unwrap();
    assert_eq!(empty, WebhookOutcome::IgnoredEvent(None));

    assert_eq!(app.fetch(REF).await.unwrap(), before);
}

#[tokio::test]
async fn non_string_event_is_ignored_not_rejected() {
    let app = TestApp::new();
    let before = app.seed_pending(REF).await;

    for body in [
        json!({ "event": 123, "data": { "reference": REF } }),
        json!({ "event": { "type": "charge.success" }, "data": { "reference": REF } }),
        json!({ "event": null, "data": "not an object" }),
    ] {
        let outcome = app
            .state
            .verification
            .handle_webhook(&serde_json::to_vec(&body).unwrap())
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::IgnoredEvent(None), "body {body}");
    }

    assert_eq!(app.fetch(REF).await.unwrap(), before);
}

#[tokio::test]
async fn malformed_json_is_invalid_payload() {
    let app = TestApp::new();
    app.seed_pending(REF).await;

    let err = app
        .state
        .verification
        .handle_webhook(b"{\"event\": \"charge.success\", ")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidPayload(_)));
    assert_eq!(app.fetch(REF).await.unwrap().status, TransactionStatus::Pending);
}

// ---- concurrent verify and webhook ----

/// Store that lets one competing write land between the engine's read and
/// its first write, the way a webhook racing a redirect would.
struct RacingStore {
    inner: InMemoryTransactionStore,
    raced: AtomicBool,
}

#[async_trait]
impl TransactionStore for RacingStore {
    async fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        self.inner.create(transaction).await
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Transaction>, StoreError> {
        self.inner.find_by_reference(reference).await
    }

    async fn update(&self, transaction: &Transaction) -> Result<Transaction, StoreError> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            let mut competing = self.inner.find_by_reference(&transaction.reference).await?.unwrap();
            competing.status = TransactionStatus::Failed;
            competing.gateway_response = Some("competing write".to_string());
            self.inner.update(&competing).await?;
        }
        self.inner.update(transaction).await
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn stale_write_is_retried_against_fresh_record() {
    let store = Arc::new(RacingStore {
        inner: InMemoryTransactionStore::new(),
        raced: AtomicBool::new(false),
    });
    store
        .create(Transaction::pending(NewTransaction {
            email: "buyer@example.com".to_string(),
            amount: 50000,
            reference: REF.to_string(),
        }))
        .await
        .unwrap();
    let gateway = Arc::new(StubGateway::new());
    let service = VerificationService::new(store.clone(), gateway.clone());

    let tx = service.verify_and_update(Some(REF)).await.unwrap();

    assert_eq!(tx.status, TransactionStatus::Success);
    assert_eq!(tx.version, 2);
    assert_eq!(gateway.verify_count(), 1);
    assert_eq!(store.find_by_reference(REF).await.unwrap().unwrap(), tx);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_verify_and_webhook_leave_one_consistent_outcome() {
    let app = TestApp::new();
    app.seed_pending(REF).await;
    app.gateway.set_verify(VerifyStub::Body(json!({
        "status": true,
        "data": { "status": "success", "reference": "GWREF" }
    })));
    let body = webhook("charge.failed", Some(REF));

    let verification = app.state.verification.clone();
    let webhook_verification = app.state.verification.clone();
    let (verified, delivered) = tokio::join!(
        tokio::spawn(async move { verification.verify_and_update(Some(REF)).await }),
        tokio::spawn(async move { webhook_verification.handle_webhook(&body).await }),
    );
    verified.unwrap().unwrap();
    delivered.unwrap().unwrap();

    let tx = app.fetch(REF).await.unwrap();
    assert_eq!(tx.version, 2, "both signals must have been written");
    match tx.status {
        TransactionStatus::Success => assert_eq!(tx.gateway_reference.as_deref(), Some("GWREF")),
        TransactionStatus::Failed => assert_eq!(tx.gateway_reference.as_deref(), Some("T685312322")),
        TransactionStatus::Pending => panic!("a terminal signal was lost"),
    }
}
