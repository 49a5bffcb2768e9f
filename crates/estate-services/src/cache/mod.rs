//! Read-through cache for property listings.
//!
//! [`CacheStore`] is the key-value backend; [`QueryCache`] layers the
//! read-through and namespace invalidation rules on top of it. Cache failures
//! never fail a request: they are logged and the query goes to the database.

mod key;
mod query;
mod store;

pub use key::{namespaced_key, property_list_key, PROPERTY_NAMESPACE};
pub use query::{Cached, QueryCache, Source};
pub use store::{CacheError, CacheStore, MemoryCacheStore};
