//! Tag Index Module
//!
//! Maps tags to the keys stored under them so groups of entries can be
//! invalidated together. Purely in-memory bookkeeping: it never touches the
//! stores, and a key listed here is not a promise that a value exists.

use std::collections::HashSet;

use dashmap::DashMap;

// == Tag Index ==
/// Concurrent tag → key-set mapping.
#[derive(Debug, Default)]
pub struct TagIndex {
    tags: DashMap<String, HashSet<String>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self {
            tags: DashMap::new(),
        }
    }

    // == Associate ==
    /// Adds `key` to the set for `tag`, creating the set on first use.
    pub fn associate(&self, tag: &str, key: &str) {
        self.tags
            .entry(tag.to_string())
            .or_default()
            .insert(key.to_string());
    }

    // == Keys For ==
    /// Returns a snapshot of the keys under `tag`; empty for unknown tags.
    pub fn keys_for(&self, tag: &str) -> HashSet<String> {
        self.tags
            .get(tag)
            .map(|keys| keys.clone())
            .unwrap_or_default()
    }

    // == Untrack ==
    /// Removes `key` from every tag set, pruning sets left empty.
    pub fn untrack(&self, key: &str) {
        self.tags.retain(|_, keys| {
            keys.remove(key);
            !keys.is_empty()
        });
    }

    // == Drop Tag ==
    /// Removes the swept `keys` from the tag's set, and the tag itself once
    /// its set is empty. Keys associated after the sweep began survive.
    pub fn drop_tag(&self, tag: &str, keys: &HashSet<String>) {
        if let Some(mut set) = self.tags.get_mut(tag) {
            set.retain(|key| !keys.contains(key));
        }
        self.tags.remove_if(tag, |_, set| set.is_empty());
    }

    // == Clear ==
    pub fn clear(&self) {
        self.tags.clear();
    }

    /// Number of tags currently tracked.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
