pub mod payment;
pub mod quote;
