//! Route policy and request classification.

use std::time::Duration;

use crate::cache::{derive_key, CacheKey};

// == Route Policy ==
/// Per-route cache metadata supplied by whatever layer owns routing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePolicy {
    /// TTL for cached results; `None` uses the engine default
    pub ttl: Option<Duration>,
    /// Tags attached to cached results, or invalidated by mutations
    pub tags: Vec<String>,
}

impl RoutePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

// == Request Kind ==
/// How the interceptor treats a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Served from the cache when possible and cached on a miss
    Read,
    /// Invalidates the route's tags and is never cached
    Mutation,
}

impl RequestKind {
    /// Classifies an HTTP method. `POST`, `PUT`, `PATCH` and `DELETE` mutate;
    /// every other method is treated as a read.
    pub fn from_method(method: &str) -> Self {
        let method = method.trim();
        if ["POST", "PUT", "PATCH", "DELETE"]
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
        {
            RequestKind::Mutation
        } else {
            RequestKind::Read
        }
    }
}

// == Request Info ==
/// The parts of a request that identify it for caching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RequestInfo {
    pub fn new<I, K, V>(method: &str, path: &str, query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            query: query
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn kind(&self) -> RequestKind {
        RequestKind::from_method(&self.method)
    }

    pub fn cache_key(&self) -> CacheKey {
        derive_key(&self.method, &self.path, self.query.iter().cloned())
    }
}
