pub mod gateway;
pub mod payment_service;
pub mod paystack_service;
pub mod reference;
pub mod verification_service;
