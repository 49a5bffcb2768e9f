//! Estate Core Library
//!
//! This crate provides the domain models, error types, configuration, role-based
//! authorization and persistence ports shared by every estate component.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod property_store;
pub mod purchase_store;
pub mod storage_types;

// Re-export commonly used types
pub use auth::{can_modify_property, Role};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use property_store::PropertyStore;
pub use purchase_store::{PurchaseCandidate, PurchaseStore, PurchaseUnit};
pub use storage_types::StorageBackend;
