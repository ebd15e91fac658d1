pub mod account;
pub mod order;
pub mod quote;
pub mod transaction;
