use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use payment_service::{
    build_router,
    config::AppConfig,
    database::{
        connection::get_db_client,
        transaction_store::{InMemoryTransactionStore, MongoTransactionStore, TransactionStore},
    },
    services::{gateway::PaymentGateway, paystack_service::PaystackService},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(if config.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    tracing::info!("🔧 {} starting ({})", config.app_name, config.environment);
    if config.is_production() && !config.verify_webhook_signature {
        tracing::warn!("Webhook signature verification is disabled in production");
    }

    let store = initialize_store(&config).await?;
    let gateway: Arc<dyn PaymentGateway> =
        Arc::new(PaystackService::new(&config).context("failed to build Paystack client")?);
    tracing::info!("✅ Paystack client ready ({})", config.paystack_base_url);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let app = build_router(AppState::new(config, store, gateway));

    tracing::info!("🚀 Server starting on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn initialize_store(config: &AppConfig) -> anyhow::Result<Arc<dyn TransactionStore>> {
    match &config.database_url {
        Some(url) => {
            let db = get_db_client(url, &config.database_name)
                .await
                .context("failed to connect to MongoDB")?;
            Ok(Arc::new(MongoTransactionStore::new(db)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; transactions will be kept in memory only");
            Ok(Arc::new(InMemoryTransactionStore::new()))
        }
    }
}
