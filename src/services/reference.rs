// services/reference.rs
use chrono::Utc;
use uuid::Uuid;

pub const REFERENCE_PREFIX: &str = "PAY";
const SUFFIX_LEN: usize = 8;

/// Builds a transaction reference of the form `PAY_<unix seconds>_<8 hex>`.
///
/// Only URL-safe characters are emitted. Uniqueness comes from the random
/// suffix; the timestamp is there for whoever greps the logs.
pub fn generate_reference() -> String {
    let timestamp = Utc::now().timestamp();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", REFERENCE_PREFIX, timestamp, &suffix[..SUFFIX_LEN])
}
