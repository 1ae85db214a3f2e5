/// `Tasks` table adapter
///
/// Same read-through / write-then-invalidate shape as [`super::members`].

use std::sync::Arc;

use tracing::{debug, info};

use super::cache::SnapshotCache;
use super::{SheetStore, StoreError};
use crate::models::task::{TaskBoard, TASK_COLUMNS};

/// Name of the tasks table
pub const TASKS_TABLE: &str = "Tasks";

/// Task store adapter for the `Tasks` table
#[derive(Clone)]
pub struct TaskSheet {
    store: Arc<dyn SheetStore>,
    cache: Arc<SnapshotCache>,
}

impl TaskSheet {
    pub fn new(store: Arc<dyn SheetStore>, cache: Arc<SnapshotCache>) -> Self {
        Self { store, cache }
    }

    /// Loads the board, serving from cache while fresh
    pub async fn load(&self) -> Result<TaskBoard, StoreError> {
        let sheet = match self.cache.get(TASKS_TABLE).await {
            Some(sheet) => sheet,
            None => {
                let sheet = self.store.read_all(TASKS_TABLE, TASK_COLUMNS).await?;
                debug!(rows = sheet.len(), backend = self.store.backend_name(), "Loaded tasks table");
                self.cache.put(TASKS_TABLE, sheet.clone()).await;
                sheet
            }
        };

        let board = TaskBoard::from_sheet(&sheet);
        if board.unparsed_count() > 0 {
            debug!(unparsed = board.unparsed_count(), "Tasks table has rows that could not be parsed");
        }

        Ok(board)
    }

    /// Overwrites the table with `board` and drops every cached snapshot
    pub async fn save(&self, board: &TaskBoard) -> Result<(), StoreError> {
        self.store.overwrite_all(TASKS_TABLE, &board.to_sheet()).await?;
        self.cache.invalidate_all().await;

        info!(tasks = board.len(), "Tasks table written");
        Ok(())
    }
}
