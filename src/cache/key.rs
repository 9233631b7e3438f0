//! Cache Key Module
//!
//! Derives stable, fixed-length cache keys from request identity.

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

// == Cache Key ==
/// Opaque cache key: hex-encoded SHA-256 of the canonical request identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Derive Key ==
/// Builds the cache key for a request.
///
/// The method is upper-cased and query parameters are grouped by name in
/// sorted order, so `?b=2&a=1` and `?a=1&b=2` share a key. Values of a
/// repeated parameter keep their relative order. An empty query is the same
/// as no query at all.
pub fn derive_key<I, K, V>(method: &str, path: &str, query: I) -> CacheKey
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in query {
        params.entry(name.into()).or_default().push(value.into());
    }

    // BTreeMap<String, Vec<String>> always serializes
    let canonical_query = serde_json::to_string(&params).unwrap_or_default();
    let raw = format!(
        "{}:{}:{}",
        method.trim().to_ascii_uppercase(),
        path,
        canonical_query
    );

    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    CacheKey(hex::encode(hasher.finalize()))
}
