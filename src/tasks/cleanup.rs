//! TTL Cleanup Task
//!
//! Background task that periodically purges expired entries from the local
//! tier. Reads still expire entries lazily; the sweep only reclaims memory
//! held by keys nobody asks for again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheEngine;

/// Spawns the expiry sweep, running every `cleanup_interval_secs` (at
/// least one second). Abort the returned handle to stop it.
pub fn spawn_cleanup_task(cache: Arc<CacheEngine>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();
            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
