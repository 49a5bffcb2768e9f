//! Estate Services Layer
//!
//! Orchestration that spans storage, persistence and cache: concurrent image
//! uploads with compensation, the atomic purchase flow, the read-through
//! listing cache, and the property lifecycle that ties them together. HTTP
//! handling stays in estate-api.

pub mod cache;
pub mod property;
pub mod purchase;
pub mod upload;

pub use cache::{
    property_list_key, CacheError, CacheStore, Cached, MemoryCacheStore, QueryCache, Source,
    PROPERTY_NAMESPACE,
};
pub use property::{PropertyImage, PropertyLifecycleService};
pub use purchase::{PurchaseCoordinator, PurchaseError};
pub use upload::{FailureReport, UploadError, UploadFile, UploadOrchestrator, UploadOutcome};
