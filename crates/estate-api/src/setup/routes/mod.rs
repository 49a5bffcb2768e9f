//! Route configuration and setup.
//!
//! Route groups are split by the roles allowed to call them; health checks
//! live in [health](health).

mod health;

use crate::auth::middleware::{auth_middleware, require_roles};
use crate::handlers;
use crate::middleware::request_id_middleware;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use estate_core::{Config, Role};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the full router with middleware applied
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let protected = authenticated_routes()
        .merge(property_manager_routes())
        .merge(admin_routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Multipart bodies carry several images; cap the whole request instead of axum's 2 MB default
    let body_limit = config.max_upload_size_bytes.max(1024 * 1024);

    let app = public_routes()
        .merge(protected)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/users", post(handlers::users::create_user))
        .route("/login", post(handlers::auth::login))
}

/// Any signed-in role
fn authenticated_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(handlers::users::list_users))
        .route("/users/{id}", get(handlers::users::get_user))
        .route("/properties", get(handlers::properties::list_properties))
        .route("/properties/{id}", get(handlers::properties::get_property))
        .route("/types", get(handlers::catalog::list_types))
        .route("/categories", get(handlers::catalog::list_categories))
        .route(
            "/transactions",
            get(handlers::transactions::list_transactions)
                .post(handlers::transactions::create_transaction),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            Role::ANY,
            require_roles,
        ))
}

/// Owners and admins
fn property_manager_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/properties", post(handlers::properties::create_property))
        .route(
            "/properties/{id}",
            put(handlers::properties::update_property)
                .delete(handlers::properties::delete_property),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            Role::PROPERTY_MANAGERS,
            require_roles,
        ))
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/types", post(handlers::catalog::create_type))
        .route("/admin/categories", post(handlers::catalog::create_category))
        .route_layer(axum::middleware::from_fn_with_state(
            Role::ADMINS,
            require_roles,
        ))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
