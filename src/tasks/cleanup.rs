//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{Encoder, Guard, Store};
use crate::config::MIN_CLEANUP_INTERVAL;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// Reads and sweeps already drop expired entries lazily; this task bounds how
/// long an untouched expired entry can keep occupying the table.
///
/// # Arguments
/// * `cache` - Shared reference to a thread-safe store
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs, raised
///   to `MIN_CLEANUP_INTERVAL` if lower
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(Store::new(Utf8Encoder));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V, E, G>(
    cache: Arc<Store<V, E, G>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    V: 'static,
    E: Encoder<V> + Send + Sync + 'static,
    G: Guard + 'static,
    Store<V, E, G>: Send + Sync,
{
    let cleanup_interval_secs = cleanup_interval_secs.max(MIN_CLEANUP_INTERVAL);
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
