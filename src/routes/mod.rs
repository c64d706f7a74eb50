//! Router HTTP
//!
//! Une las rutas de cada recurso bajo `/api`, más `/health`.

pub mod auth_routes;
pub mod booking_routes;
pub mod catalog_routes;
pub mod location_routes;
pub mod notification_routes;
pub mod profile_routes;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::cache::CacheBackend;
use crate::middleware::cors_layer;
use crate::state::AppState;

/// Crear el router completo de la API
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes::create_auth_router())
        .nest("/api/services", catalog_routes::create_service_router())
        .nest("/api/cleaners", catalog_routes::create_cleaner_router())
        .nest("/api/bookings", booking_routes::create_booking_router())
        .nest("/api/locations", location_routes::create_location_router())
        .nest("/api/notifications", notification_routes::create_notification_router())
        .nest("/api/profile", profile_routes::create_profile_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check
async fn health(State(state): State<AppState>) -> Json<Value> {
    let cache = state.profile_cache.backend();
    let cache_ok = match cache {
        CacheBackend::Redis(client) => client.is_connected().await,
        CacheBackend::Memory(_) => true,
    };

    Json(json!({
        "status": "ok",
        "environment": state.config.environment,
        "store": format!("{:?}", state.config.store).to_lowercase(),
        "cache": { "backend": cache.name(), "connected": cache_ok },
        "realtime_subscriptions": state.feed.active_subscriptions(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
