// models/transaction.rs
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
        }
    }

    /// Maps the gateway's nested payment status onto ours. Anything the
    /// gateway has not settled yet (`abandoned`, `ongoing`, ...) stays pending.
    pub fn from_gateway(status: &str) -> Self {
        match status {
            "success" => TransactionStatus::Success,
            "failed" => TransactionStatus::Failed,
            _ => TransactionStatus::Pending,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub email: String,
    /// Minor currency units (kobo).
    pub amount: i64,
    pub reference: String,
    pub status: TransactionStatus,

    pub gateway_reference: Option<String>,
    pub gateway_response: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Bumped on every successful update; used for compare-and-swap writes.
    #[serde(default)]
    pub version: i64,
}

impl Transaction {
    pub fn pending(new: NewTransaction) -> Self {
        let now = Utc::now();
        Transaction {
            id: Some(ObjectId::new()),
            email: new.email,
            amount: new.amount,
            reference: new.reference,
            status: TransactionStatus::Pending,
            gateway_reference: None,
            gateway_response: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Amount in major units, e.g. `1500` kobo renders as `15.00`.
    pub fn amount_major(&self) -> String {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// A validated request to open a new transaction.
#[derive(Debug, Clone, Validate)]
pub struct NewTransaction {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(range(min = 100, message = "Amount must be at least 1 NGN"))]
    pub amount: i64,

    pub reference: String,
}
