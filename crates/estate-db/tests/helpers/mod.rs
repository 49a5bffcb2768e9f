//! Test helpers: a throwaway Postgres with the schema applied.
//!
//! Each test gets its own container. When Docker is not reachable the
//! helpers return `None` and the test returns early.

#![allow(dead_code)]

use std::time::Duration;

use estate_core::models::NewProperty;
use estate_core::{PropertyStore, Role};
use estate_db::{CatalogRepository, PropertyRepository, UserRepository};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::testcontainers::ContainerAsync;

pub struct TestDb {
    pub pool: PgPool,
    _container: ContainerAsync<Postgres>,
}

/// Users and catalog rows every purchase test needs.
pub struct Seed {
    pub owner_id: i64,
    pub client_ids: [i64; 2],
    pub sale_type_id: i64,
    pub rent_type_id: i64,
    pub category_id: i64,
}

pub async fn setup_test_db() -> Option<TestDb> {
    let container = match Postgres::default().start().await {
        Ok(container) => container,
        Err(e) => {
            eprintln!("skipping Postgres test, Docker unavailable: {}", e);
            return None;
        }
    };

    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("container port");
    let connection_string = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&connection_string)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(TestDb {
        pool,
        _container: container,
    })
}

async fn type_id(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT id FROM property_types WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("seeded property type")
}

pub async fn seed(pool: &PgPool) -> Seed {
    let users = UserRepository::new(pool.clone());
    let owner = users
        .create("Olga Owner", "owner@example.com", "hash", Role::Owner)
        .await
        .unwrap();
    let first = users
        .create("Carl Client", "carl@example.com", "hash", Role::Client)
        .await
        .unwrap();
    let second = users
        .create("Cora Client", "cora@example.com", "hash", Role::Client)
        .await
        .unwrap();
    let category = CatalogRepository::new(pool.clone())
        .create_category("apartment")
        .await
        .unwrap();

    Seed {
        owner_id: owner.id,
        client_ids: [first.id, second.id],
        sale_type_id: type_id(pool, "sale").await,
        rent_type_id: type_id(pool, "rent").await,
        category_id: category.id,
    }
}

/// Insert a property without an image prefix, as during an upload.
pub async fn insert_pending(pool: &PgPool, seed: &Seed, type_id: i64) -> i64 {
    let created = PropertyRepository::new(pool.clone())
        .insert(&NewProperty {
            name: "Harbour loft".to_string(),
            description: "Two bedrooms with a sea view".to_string(),
            price: Decimal::new(250_000, 0),
            location: "Porto".to_string(),
            owner_id: seed.owner_id,
            property_type_id: type_id,
            property_category_id: seed.category_id,
        })
        .await
        .unwrap();
    created.id
}

/// Insert a property whose images are stored.
pub async fn insert_listed(pool: &PgPool, seed: &Seed, type_id: i64) -> i64 {
    let id = insert_pending(pool, seed, type_id).await;
    PropertyRepository::new(pool.clone())
        .set_image_prefix(id, &format!("property/property_{}", id))
        .await
        .unwrap();
    id
}

pub async fn status_of(pool: &PgPool, id: i64) -> String {
    sqlx::query_scalar::<_, String>("SELECT status::text FROM properties WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn transaction_count(pool: &PgPool, property_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM transactions WHERE property_id = $1")
        .bind(property_id)
        .fetch_one(pool)
        .await
        .unwrap()
}
