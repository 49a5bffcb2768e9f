//! Database repositories for data access layer
//!
//! Each repository owns one table family and exposes CRUD operations plus the
//! specialized queries its handlers need. `purchase` holds the transactional
//! unit of work behind the purchase flow.

pub mod catalog;
pub mod property;
pub mod purchase;
pub mod transaction;
pub mod user;

pub use catalog::CatalogRepository;
pub use property::PropertyRepository;
pub use purchase::{PgPurchaseStore, PgPurchaseUnit};
pub use transaction::TransactionRepository;
pub use user::UserRepository;
