pub mod auth;
pub mod catalog;
pub mod properties;
pub mod transactions;
pub mod users;
