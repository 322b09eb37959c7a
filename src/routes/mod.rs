pub mod payments;
pub mod webhook;
