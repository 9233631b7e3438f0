//! Response DTOs for the cache admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for tag invalidation (POST /cache/invalidate)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// The tags that were invalidated
    pub tags: Vec<String>,
}

impl InvalidateResponse {
    /// Creates a new InvalidateResponse
    pub fn new(tags: Vec<String>) -> Self {
        Self {
            message: format!("Invalidated {} tag(s)", tags.len()),
            tags,
        }
    }
}

/// Response body for entry deletion (DELETE /cache/entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for a full clear (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn new() -> Self {
        Self {
            message: "All cache cleared".to_string(),
        }
    }
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hits across both tiers
    pub hits: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Name of the shared backend ("noop" in memory-only mode)
    pub backend: String,
}

impl StatsResponse {
    /// Creates a new StatsResponse from an engine snapshot
    pub fn new(stats: CacheStats, backend: impl Into<String>) -> Self {
        Self {
            hits: stats.hits(),
            hit_rate: stats.hit_rate(),
            stats,
            backend: backend.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
///
/// The server reports healthy whether or not the shared backend is
/// reachable; remote failures only show up in the stats counters.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub backend: &'static str,
}

impl HealthResponse {
    pub fn healthy(backend: &'static str) -> Self {
        Self {
            status: "healthy",
            timestamp: chrono::Utc::now().to_rfc3339(),
            backend,
        }
    }
}

/// Body of every error response, built from [`crate::error::CacheError`]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_response_serialize() {
        let resp = InvalidateResponse::new(vec!["users".to_string()]);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("users"));
        assert!(json.contains("Invalidated 1 tag(s)"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new("deleted_key");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("deleted_key"));
        assert!(json.contains("deleted"));
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let stats = CacheStats {
            local_hits: 6,
            remote_hits: 2,
            misses: 2,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new(stats, "noop");
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["local_hits"], 6);
        assert_eq!(json["hits"], 8);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(json["backend"], "noop");
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy("redis");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["backend"], "redis");
        assert!(chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_value(ErrorResponse::new("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom"}));
    }
}
