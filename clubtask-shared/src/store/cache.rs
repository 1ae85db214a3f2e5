/// Snapshot cache in front of the sheet store
///
/// Holds the most recent [`Sheet`] read for each table for a short time-to-live
/// (30 seconds by default) to cut read traffic against the backing store.
///
/// # Invalidation
///
/// The cache never sees writes on its own. Every writer must call
/// [`SnapshotCache::invalidate_all`] right after a successful overwrite;
/// otherwise readers keep seeing the old snapshot until the TTL runs out.
/// The table adapters in [`super::members`] and [`super::tasks`] do this.
///
/// # Example
///
/// ```
/// use clubtask_shared::store::{cache::SnapshotCache, Sheet};
/// use std::time::Duration;
///
/// # async fn example() {
/// let cache = SnapshotCache::new(Duration::from_secs(30));
/// cache.put("Members", Sheet::with_columns(&["Name"])).await;
/// assert!(cache.get("Members").await.is_some());
///
/// cache.invalidate_all().await;
/// assert!(cache.get("Members").await.is_none());
/// # }
/// ```

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::Sheet;

/// Default snapshot time-to-live
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CachedSheet {
    sheet: Sheet,
    expires_at: Instant,
}

/// Time-boxed cache of table snapshots, keyed by table name
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedSheet>>,
}

impl SnapshotCache {
    /// Creates a cache with the given time-to-live
    ///
    /// A zero TTL disables caching: every `get` misses.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached snapshot of `table` if it has not expired
    pub async fn get(&self, table: &str) -> Option<Sheet> {
        let entries = self.entries.read().await;
        let entry = entries.get(table)?;

        if Instant::now() >= entry.expires_at {
            debug!(table, "Snapshot cache entry expired");
            return None;
        }

        debug!(table, "Snapshot cache hit");
        Some(entry.sheet.clone())
    }

    /// Stores a fresh snapshot of `table`
    pub async fn put(&self, table: &str, sheet: Sheet) {
        if self.ttl.is_zero() {
            return;
        }

        self.entries.write().await.insert(
            table.to_string(),
            CachedSheet {
                sheet,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drops the snapshot of one table
    pub async fn invalidate(&self, table: &str) {
        self.entries.write().await.remove(table);
    }

    /// Drops every snapshot
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        debug!(entries = entries.len(), "Invalidating snapshot cache");
        entries.clear();
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_TTL)
    }
}
