use mongodb::{
    bson::doc,
    options::IndexOptions,
    Client, Database, IndexModel,
};
use tracing::info;

use crate::database::transaction_store::TRANSACTIONS_COLLECTION;
use crate::errors::StoreError;
use crate::models::transaction::Transaction;

pub async fn get_db_client(database_url: &str, db_name: &str) -> Result<Database, StoreError> {
    let client = Client::with_uri_str(database_url).await?;
    let db = client.database(db_name);

    db.run_command(doc! { "ping": 1 }).await?;
    info!("✅ Connected to database: {}", db_name);

    ensure_indexes(&db).await?;
    Ok(db)
}

/// `reference` must be unique; `gateway_reference` is indexed for lookups
/// from the gateway dashboard side.
async fn ensure_indexes(db: &Database) -> Result<(), StoreError> {
    let collection = db.collection::<Transaction>(TRANSACTIONS_COLLECTION);

    let unique_reference = IndexModel::builder()
        .keys(doc! { "reference": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    let gateway_reference = IndexModel::builder()
        .keys(doc! { "gateway_reference": 1 })
        .build();
    let email = IndexModel::builder().keys(doc! { "email": 1 }).build();

    collection
        .create_indexes([unique_reference, gateway_reference, email])
        .await?;
    info!("📂 Indexes ensured on '{}'", TRANSACTIONS_COLLECTION);
    Ok(())
}
