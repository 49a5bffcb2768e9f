//! Estate Storage Library
//!
//! This crate provides the blob storage abstraction used for property images,
//! with implementations for S3 (and S3-compatible providers) and the local
//! filesystem.
//!
//! # Storage key format
//!
//! Images of a property live under `property/property_{id}`; each file is
//! stored as `{prefix}/image_{index}{ext}`. Keys must not contain `..` or a
//! leading `/`. Key generation is centralized in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use estate_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{image_key, image_prefix};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
