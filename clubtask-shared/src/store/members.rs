/// `Members` table adapter
///
/// Reads the member directory through the snapshot cache and writes it back
/// as a full overwrite, invalidating the cache afterwards.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use clubtask_shared::store::{cache::SnapshotCache, members::MemberSheet, memory::MemorySheetStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sheet = MemberSheet::new(Arc::new(MemorySheetStore::new()), Arc::new(SnapshotCache::default()));
/// let directory = sheet.load().await?;
/// assert!(directory.is_empty());
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use tracing::{debug, info};

use super::cache::SnapshotCache;
use super::{SheetStore, StoreError};
use crate::models::member::{MemberDirectory, MEMBER_COLUMNS};

/// Name of the members table
pub const MEMBERS_TABLE: &str = "Members";

/// Credential store adapter for the `Members` table
#[derive(Clone)]
pub struct MemberSheet {
    store: Arc<dyn SheetStore>,
    cache: Arc<SnapshotCache>,
}

impl MemberSheet {
    pub fn new(store: Arc<dyn SheetStore>, cache: Arc<SnapshotCache>) -> Self {
        Self { store, cache }
    }

    /// Loads the directory, serving from cache while fresh
    ///
    /// # Errors
    ///
    /// Returns the store error when the table cannot be read
    pub async fn load(&self) -> Result<MemberDirectory, StoreError> {
        let sheet = match self.cache.get(MEMBERS_TABLE).await {
            Some(sheet) => sheet,
            None => {
                let sheet = self.store.read_all(MEMBERS_TABLE, MEMBER_COLUMNS).await?;
                debug!(rows = sheet.len(), backend = self.store.backend_name(), "Loaded members table");
                self.cache.put(MEMBERS_TABLE, sheet.clone()).await;
                sheet
            }
        };

        Ok(MemberDirectory::from_sheet(&sheet))
    }

    /// Overwrites the table with `directory` and drops every cached snapshot
    ///
    /// # Errors
    ///
    /// Returns the store error when the write fails; the cache is left as is
    pub async fn save(&self, directory: &MemberDirectory) -> Result<(), StoreError> {
        self.store
            .overwrite_all(MEMBERS_TABLE, &directory.to_sheet())
            .await?;
        self.cache.invalidate_all().await;

        info!(members = directory.len(), "Members table written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::member::{Member, MemberRole, MemberStatus};
    use crate::store::memory::MemorySheetStore;

    #[tokio::test]
    async fn test_save_then_load_sees_write() {
        let store = Arc::new(MemorySheetStore::new());
        let sheet = MemberSheet::new(store.clone(), Arc::new(SnapshotCache::default()));

        // Prime the cache with the empty table
        assert!(sheet.load().await.unwrap().is_empty());

        let mut directory = MemberDirectory::new();
        directory.push(Member::new("Ada", MemberRole::Dev, "x", MemberStatus::Active, "System"));
        sheet.save(&directory).await.unwrap();

        let loaded = sheet.load().await.unwrap();
        assert_eq!(loaded.get("Ada").unwrap().role, MemberRole::Dev);
    }

    #[tokio::test]
    async fn test_load_serves_cached_snapshot() {
        let store = Arc::new(MemorySheetStore::new());
        let sheet = MemberSheet::new(store.clone(), Arc::new(SnapshotCache::default()));

        assert!(sheet.load().await.unwrap().is_empty());

        // Writes that bypass the adapter stay invisible until the TTL runs out
        store
            .seed(
                MEMBERS_TABLE,
                vec![
                    vec!["Name".to_string(), "Role".to_string()],
                    vec!["Ada".to_string(), "Dev".to_string()],
                ],
            )
            .await;

        assert!(sheet.load().await.unwrap().is_empty());
    }
}
