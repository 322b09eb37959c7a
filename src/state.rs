use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::transaction_store::TransactionStore;
use crate::services::gateway::PaymentGateway;
use crate::services::payment_service::PaymentService;
use crate::services::verification_service::VerificationService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn TransactionStore>,
    pub payments: Arc<PaymentService>,
    pub verification: Arc<VerificationService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn TransactionStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let payments = PaymentService::new(store.clone(), gateway.clone(), config.currency.clone());
        let verification = VerificationService::new(store.clone(), gateway);

        AppState {
            config: Arc::new(config),
            store,
            payments: Arc::new(payments),
            verification: Arc::new(verification),
        }
    }
}
