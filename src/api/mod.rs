//! API Module
//!
//! HTTP boundary of the cache: the response caching middleware and the
//! admin REST API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /cache/stats` - Get cache statistics
//! - `POST /cache/invalidate` - Invalidate entries by tag
//! - `DELETE /cache/entries/:key` - Delete one entry
//! - `DELETE /cache` - Clear both tiers

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use middleware::{cache_response, request_info, CachedRoute, X_CACHE};
pub use routes::create_router;
