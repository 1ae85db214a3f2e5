/// In-memory sheet store
///
/// Keeps every table as a raw text grid inside the process. Values pass
/// through the same grid conversion as the remote backends, so a round trip
/// behaves like a real sheet: everything comes back as text and blank rows
/// disappear.
///
/// Used by tests and by the `memory` backend for local development.
///
/// # Example
///
/// ```
/// use clubtask_shared::store::{memory::MemorySheetStore, SheetStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemorySheetStore::new();
/// let sheet = store.read_all("Tasks", &["TaskID", "TaskName"]).await?;
/// assert!(sheet.is_empty());
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Sheet, SheetStore, StoreError};

/// Process-local sheet store
#[derive(Debug, Default)]
pub struct MemorySheetStore {
    tables: RwLock<HashMap<String, Vec<Vec<String>>>>,
}

impl MemorySheetStore {
    /// Creates a store with no tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a table with a raw grid (first row is the header)
    pub async fn seed(&self, table: &str, grid: Vec<Vec<String>>) {
        self.tables.write().await.insert(table.to_string(), grid);
    }

    /// Returns the raw grid of a table, if it exists
    pub async fn grid(&self, table: &str) -> Option<Vec<Vec<String>>> {
        self.tables.read().await.get(table).cloned()
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn read_all(&self, table: &str, default_columns: &[&str]) -> Result<Sheet, StoreError> {
        let grid = self.tables.read().await.get(table).cloned();

        Ok(match grid {
            Some(grid) => Sheet::from_grid(grid, default_columns),
            None => Sheet::with_columns(default_columns),
        })
    }

    async fn overwrite_all(&self, table: &str, sheet: &Sheet) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .insert(table.to_string(), sheet.to_grid());
        Ok(())
    }
}
