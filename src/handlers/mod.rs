// handlers/mod.rs - HTTP handlers
//
// Service endpoints live here; resource CRUD handlers are generic over the
// resource type and live in `resource`.

pub mod resource;

pub use resource::{resource_routes, DeleteHooks, ResourceState};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "data": {
            "name": "Storefront Admin API",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "products": "/api/products[/:id] (GET public, writes require admin)",
                "users": "/admin/users[/:id] (admin)",
                "orders": "/admin/orders[/:id] (admin)",
                "settings": "/admin/settings[/:id] (admin)",
            }
        },
        "error": null
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::OK,
            Json(json!({
                "data": { "status": "ok", "timestamp": now, "database": "in-memory" },
                "error": null
            })),
        );
    };

    match DatabaseManager::health_check(pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "data": { "status": "ok", "timestamp": now, "database": "ok" },
                "error": null
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "data": { "status": "degraded", "timestamp": now },
                    "error": "database unavailable"
                })),
            )
        }
    }
}
