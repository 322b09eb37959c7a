pub mod payments;
pub mod system;
pub mod webhook;
