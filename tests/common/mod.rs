#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use payment_service::{
    build_router,
    config::AppConfig,
    database::transaction_store::{InMemoryTransactionStore, TransactionStore},
    errors::{GatewayError, StoreError},
    models::paystack::{InitializeRequest, Initialized, Verification},
    models::transaction::{NewTransaction, Transaction},
    services::gateway::PaymentGateway,
    state::AppState,
};

pub const CHECKOUT_URL: &str = "https://checkout.paystack.test/0peioxfhpn";
pub const TEST_SECRET: &str = "sk_test_0123456789";

pub enum VerifyStub {
    Body(Value),
    HttpStatus(u16),
    Malformed,
}

/// In-process gateway double. Records every call it receives.
pub struct StubGateway {
    initialize_result: Mutex<Result<Initialized, String>>,
    verify_stub: Mutex<VerifyStub>,
    pub initialize_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub last_initialize: Mutex<Option<InitializeRequest>>,
}

impl StubGateway {
    pub fn new() -> Self {
        StubGateway {
            initialize_result: Mutex::new(Ok(Initialized {
                authorization_url: CHECKOUT_URL.to_string(),
                gateway_reference: None,
            })),
            verify_stub: Mutex::new(VerifyStub::Body(success_verification("GWREF"))),
            initialize_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            last_initialize: Mutex::new(None),
        }
    }

    pub fn reject_initialize(&self, message: &str) {
        *self.initialize_result.lock().unwrap() = Err(message.to_string());
    }

    pub fn set_verify(&self, stub: VerifyStub) {
        *self.verify_stub.lock().unwrap() = stub;
    }

    pub fn verify_count(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn initialize_count(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn initialize(&self, request: InitializeRequest) -> Result<Initialized, GatewayError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        let reference = request.reference.clone();
        *self.last_initialize.lock().unwrap() = Some(request);
        self.initialize_result
            .lock()
            .unwrap()
            .clone()
            .map(|initialized| Initialized {
                gateway_reference: Some(reference),
                ..initialized
            })
            .map_err(GatewayError::Rejected)
    }

    async fn verify(&self, _reference: &str) -> Result<Verification, GatewayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        match &*self.verify_stub.lock().unwrap() {
            VerifyStub::Body(body) => Verification::from_raw(body.clone())
                .map_err(|e| GatewayError::MalformedResponse(e.to_string())),
            VerifyStub::HttpStatus(status) => Err(GatewayError::Status {
                status: *status,
                body: "{\"status\":false}".to_string(),
            }),
            VerifyStub::Malformed => Err(GatewayError::MalformedResponse("expected value".to_string())),
        }
    }
}

pub fn success_verification(gateway_reference: &str) -> Value {
    json!({
        "status": true,
        "message": "Verification successful",
        "data": { "status": "success", "reference": gateway_reference, "amount": 50000 }
    })
}

/// Store wrapper that counts every call made against it.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryTransactionStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TransactionStore for CountingStore {
    async fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        self.tick();
        self.inner.create(transaction).await
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Transaction>, StoreError> {
        self.tick();
        self.inner.find_by_reference(reference).await
    }

    async fn update(&self, transaction: &Transaction) -> Result<Transaction, StoreError> {
        self.tick();
        self.inner.update(transaction).await
    }

    async fn ping(&self) -> bool {
        self.inner.ping().await
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        paystack_secret_key: TEST_SECRET.to_string(),
        app_name: "Payment Service".to_string(),
        ..AppConfig::default()
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<CountingStore>,
    pub gateway: Arc<StubGateway>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(CountingStore::default());
        let gateway = Arc::new(StubGateway::new());
        let state = AppState::new(config, store.clone(), gateway.clone());
        TestApp { state, store, gateway }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn seed_pending(&self, reference: &str) -> Transaction {
        self.store
            .inner
            .create(Transaction::pending(NewTransaction {
                email: "buyer@example.com".to_string(),
                amount: 50000,
                reference: reference.to_string(),
            }))
            .await
            .unwrap()
    }

    pub async fn fetch(&self, reference: &str) -> Option<Transaction> {
        self.store.inner.find_by_reference(reference).await.unwrap()
    }
}
