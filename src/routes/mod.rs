//! Routers de la API
//!
//! Un router por recurso; los middlewares de autenticación y rol se
//! aplican por sub-router.

pub mod auth_routes;
pub mod driver_routes;
pub mod notification_routes;
pub mod order_routes;
pub mod upload_routes;
pub mod vehicle_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;

use crate::middleware::cors::cors_middleware;
use crate::state::AppState;

/// Ensamblar la aplicación completa
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes::create_auth_router(state.clone()))
        .nest("/api/vehicle", vehicle_routes::create_vehicle_router(state.clone()))
        .nest("/api/order", order_routes::create_order_router(state.clone()))
        .nest(
            "/api/notification",
            notification_routes::create_notification_router(state.clone()),
        )
        .nest("/api/driver", driver_routes::create_driver_router(state.clone()))
        .nest("/api/upload", upload_routes::create_upload_router(state.clone()))
        .layer(cors_middleware())
        .with_state(state)
}

/// Health check simple
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "service": "rental-management",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
