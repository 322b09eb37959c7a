pub mod paystack;
pub mod transaction;
