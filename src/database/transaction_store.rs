// database/transaction_store.rs
use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, to_bson},
    error::{ErrorKind, WriteFailure},
    Collection, Database,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::StoreError;
use crate::models::transaction::Transaction;

pub const TRANSACTIONS_COLLECTION: &str = "transactions";

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Persistence for transaction records, keyed by `reference`.
///
/// `update` is a compare-and-swap on `version`: it succeeds only if the
/// stored record still carries the version the caller read, and returns the
/// record as written (version bumped, `updated_at` refreshed).
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError>;

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Transaction>, StoreError>;

    async fn update(&self, transaction: &Transaction) -> Result<Transaction, StoreError>;

    /// Cheap liveness probe for `/health`.
    async fn ping(&self) -> bool;
}

fn next_revision(transaction: &Transaction) -> Transaction {
    let mut written = transaction.clone();
    written.version = transaction.version + 1;
    written.updated_at = Utc::now();
    written
}

#[derive(Clone)]
pub struct MongoTransactionStore {
    db: Database,
    collection: Collection<Transaction>,
}

impl MongoTransactionStore {
    pub fn new(db: Database) -> Self {
        let collection = db.collection(TRANSACTIONS_COLLECTION);
        MongoTransactionStore { db, collection }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl TransactionStore for MongoTransactionStore {
    async fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        match self.collection.insert_one(&transaction).await {
            Ok(_) => Ok(transaction),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateReference(transaction.reference)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Transaction>, StoreError> {
        Ok(self.collection.find_one(doc! { "reference": reference }).await?)
    }

    async fn update(&self, transaction: &Transaction) -> Result<Transaction, StoreError> {
        let written = next_revision(transaction);
        let updated_at = to_bson(&written.updated_at).map_err(|e| StoreError::Backend(e.to_string()))?;

        let filter = doc! {
            "reference": &transaction.reference,
            "version": transaction.version,
        };
        let update = doc! {
            "$set": {
                "status": written.status.as_str(),
                "gateway_reference": written.gateway_reference.clone(),
                "gateway_response": written.gateway_response.clone(),
                "updated_at": updated_at,
                "version": written.version,
            }
        };

        let result = self.collection.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(StoreError::Conflict(transaction.reference.clone()));
        }
        Ok(written)
    }

    async fn ping(&self) -> bool {
        self.db.run_command(doc! { "ping": 1 }).await.is_ok()
    }
}

/// Process-local store used when no database is configured, and by tests.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<String, Transaction>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.transactions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transactions.read().await.is_empty()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        let mut transactions = self.transactions.write().await;
        if transactions.contains_key(&transaction.reference) {
            return Err(StoreError::DuplicateReference(transaction.reference));
        }
        transactions.insert(transaction.reference.clone(), transaction.clone());
        Ok(transaction)
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Transaction>, StoreError> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(reference).cloned())
    }

    async fn update(&self, transaction: &Transaction) -> Result<Transaction, StoreError> {
        let mut transactions = self.transactions.write().await;
        match transactions.get_mut(&transaction.reference) {
            Some(stored) if stored.version == transaction.version => {
                let written = next_revision(transaction);
                *stored = written.clone();
                Ok(written)
            }
            _ => Err(StoreError::Conflict(transaction.reference.clone())),
        }
    }

    async fn ping(&self) -> bool {
        true
    }
}
