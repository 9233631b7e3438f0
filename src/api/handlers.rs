//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::CacheEngine;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::intercept::CacheInterceptor;
use crate::models::{
    ClearResponse, DeleteResponse, HealthResponse, InvalidateRequest, InvalidateResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
///
/// The engine is internally synchronized, so handlers share it through a
/// plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Two-tier cache engine
    pub cache: Arc<CacheEngine>,
    /// Interceptor bound to the same engine, used by cached routes
    pub interceptor: CacheInterceptor,
}

impl AppState {
    /// Creates a new AppState around the given engine.
    pub fn new(cache: CacheEngine) -> Self {
        let cache = Arc::new(cache);
        Self {
            interceptor: CacheInterceptor::new(Arc::clone(&cache)),
            cache,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheEngine::from_config(config))
    }
}

/// Handler for POST /cache/invalidate
///
/// Drops every entry associated with any of the given tags.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.invalidate_tags(&req.tags).await;

    Ok(Json(InvalidateResponse::new(req.tags)))
}

/// Handler for DELETE /cache/entries/:key
///
/// Deleting an absent key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    state.cache.del(&key).await;
    Json(DeleteResponse::new(key))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear().await;
    Json(ClearResponse::new())
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.cache.stats(),
        state.cache.remote_backend(),
    ))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.remote_backend()))
}
