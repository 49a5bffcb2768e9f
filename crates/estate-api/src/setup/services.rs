//! Wiring of repositories and services into [`AppState`].

use crate::auth::JwtService;
use crate::state::AppState;
use estate_core::{Config, PropertyStore, PurchaseStore};
use estate_db::{
    CatalogRepository, PgPurchaseStore, PropertyRepository, TransactionRepository, UserRepository,
};
use estate_services::{
    MemoryCacheStore, PropertyLifecycleService, PurchaseCoordinator, QueryCache,
    UploadOrchestrator, PROPERTY_NAMESPACE,
};
use estate_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

pub fn initialize_services(
    config: Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Arc<AppState> {
    let listing_cache = config.cache_enabled.then(|| {
        Arc::new(QueryCache::new(
            Arc::new(MemoryCacheStore::new()),
            PROPERTY_NAMESPACE,
            config.cache_ttl(),
        ))
    });
    tracing::info!(
        enabled = config.cache_enabled,
        ttl_seconds = config.cache_ttl_seconds,
        "Listing cache configured"
    );

    let properties: Arc<dyn PropertyStore> = Arc::new(PropertyRepository::new(pool.clone()));
    let purchase_store: Arc<dyn PurchaseStore> = Arc::new(PgPurchaseStore::new(pool.clone()));

    let uploads = UploadOrchestrator::new(storage.clone(), config.upload_max_workers);
    let lifecycle =
        PropertyLifecycleService::new(properties.clone(), uploads, listing_cache.clone());
    let purchases = PurchaseCoordinator::new(purchase_store, listing_cache.clone());

    Arc::new(AppState {
        jwt: JwtService::new(&config.jwt_secret, config.jwt_expiry_hours),
        users: UserRepository::new(pool.clone()),
        catalog: CatalogRepository::new(pool.clone()),
        transactions: TransactionRepository::new(pool.clone()),
        properties,
        lifecycle,
        purchases,
        listing_cache,
        storage,
        pool,
        config,
    })
}
