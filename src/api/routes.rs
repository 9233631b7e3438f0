//! API Routes
//!
//! Configures the Axum router with the cache admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, health_handler, invalidate_handler, stats_handler, AppState,
};

/// Creates the admin router.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /cache/stats` - Get cache statistics
/// - `POST /cache/invalidate` - Invalidate entries by tag
/// - `DELETE /cache/entries/:key` - Delete one entry
/// - `DELETE /cache` - Clear both tiers
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route("/cache/entries/:key", delete(delete_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
