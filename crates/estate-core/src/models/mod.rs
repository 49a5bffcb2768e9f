//! Data models for the application
//!
//! Each sub-module covers one resource of the listing backend.

mod catalog;
mod property;
mod transaction;
mod user;

pub use catalog::*;
pub use property::*;
pub use transaction::*;
pub use user::*;
