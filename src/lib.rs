pub mod actions;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod types;

use axum::{http::HeaderValue, middleware::from_fn_with_state, routing::get, Router};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenCodec;
use crate::cache::{CacheInvalidator, NoopInvalidator, TagCache};
use crate::config::AppConfig;
use crate::database::models::{Order, Product, Resource, Setting, User};
use crate::database::{DatabaseError, DependentRows, MemoryTable, Repository, ResourceTable};
use crate::handlers::{resource_routes, DeleteHooks, ResourceState};
use crate::middleware::{access_control_middleware, AccessGate};

/// State shared by the service endpoints
#[derive(Clone, Default)]
pub struct AppState {
    /// `None` when serving in-memory tables
    pub pool: Option<PgPool>,
}

/// Table handles and delete hooks for every resource
pub struct Storage {
    pool: Option<PgPool>,
    products: (Arc<dyn ResourceTable<Product>>, DeleteHooks),
    users: (Arc<dyn ResourceTable<User>>, DeleteHooks),
    orders: (Arc<dyn ResourceTable<Order>>, DeleteHooks),
    settings: (Arc<dyn ResourceTable<Setting>>, DeleteHooks),
}

impl Storage {
    /// Postgres tables; child rows are removed in the parent's delete transaction
    pub fn postgres(pool: PgPool) -> Result<Self, DatabaseError> {
        let products = DependentRows::new().cascade("product_images", "product_id")?;
        let users = DependentRows::new()
            .cascade("accounts", "user_id")?
            .cascade("sessions", "user_id")?;
        let orders = DependentRows::new().cascade("order_items", "order_id")?;

        Ok(Self {
            products: (
                Arc::new(Repository::<Product>::new(pool.clone())?.with_dependents(products)),
                DeleteHooks::default(),
            ),
            users: (
                Arc::new(Repository::<User>::new(pool.clone())?.with_dependents(users)),
                DeleteHooks::default(),
            ),
            orders: (
                Arc::new(Repository::<Order>::new(pool.clone())?.with_dependents(orders)),
                DeleteHooks::default(),
            ),
            settings: (
                Arc::new(Repository::<Setting>::new(pool.clone())?),
                DeleteHooks::default(),
            ),
            pool: Some(pool),
        })
    }

    /// Empty in-process tables; nothing depends on anything
    pub fn in_memory() -> Self {
        Self {
            pool: None,
            products: (Arc::new(MemoryTable::<Product>::new()), DeleteHooks::default()),
            users: (Arc::new(MemoryTable::<User>::new()), DeleteHooks::default()),
            orders: (Arc::new(MemoryTable::<Order>::new()), DeleteHooks::default()),
            settings: (Arc::new(MemoryTable::<Setting>::new()), DeleteHooks::default()),
        }
    }
}

fn mount<R: Resource>(
    base: &str,
    (table, hooks): (Arc<dyn ResourceTable<R>>, DeleteHooks),
    reads: &Arc<TagCache>,
    invalidator: &Arc<dyn CacheInvalidator>,
) -> Router {
    let state = ResourceState::new(table, reads.clone(), hooks).with_invalidator(invalidator.clone());
    resource_routes(base, state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the full application router
pub fn app(config: &AppConfig, storage: Storage) -> anyhow::Result<Router> {
    let codec = TokenCodec::from_config(config)?;
    let gate = Arc::new(AccessGate::from_config(codec, config));

    let reads = Arc::new(TagCache::new(config.cache.enable_read_cache));
    let invalidator: Arc<dyn CacheInvalidator> = if reads.is_enabled() {
        reads.clone()
    } else {
        Arc::new(NoopInvalidator)
    };

    let service = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .with_state(AppState {
            pool: storage.pool.clone(),
        });

    let mut router = Router::new()
        .merge(service)
        .merge(mount("/api/products", storage.products, &reads, &invalidator))
        .merge(mount("/admin/users", storage.users, &reads, &invalidator))
        .merge(mount("/admin/orders", storage.orders, &reads, &invalidator))
        .merge(mount("/admin/settings", storage.settings, &reads, &invalidator))
        .layer(from_fn_with_state(gate, access_control_middleware));

    if config.security.enable_cors {
        router = router.layer(cors_layer(config));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    Ok(router)
}
