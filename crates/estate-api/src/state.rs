//! Application state shared by every handler.

use crate::auth::JwtService;
use estate_core::{Config, PropertyStore};
use estate_db::{CatalogRepository, TransactionRepository, UserRepository};
use estate_services::{PropertyLifecycleService, PurchaseCoordinator, QueryCache};
use estate_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub jwt: JwtService,
    pub storage: Arc<dyn Storage>,
    pub users: UserRepository,
    pub catalog: CatalogRepository,
    pub transactions: TransactionRepository,
    /// Read side of property persistence; writes go through `lifecycle`
    pub properties: Arc<dyn PropertyStore>,
    pub lifecycle: PropertyLifecycleService,
    pub purchases: PurchaseCoordinator,
    /// `None` when the listing cache is disabled
    pub listing_cache: Option<Arc<QueryCache>>,
}
