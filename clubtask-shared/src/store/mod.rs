/// Sheet store abstraction
///
/// ClubTask keeps its data in a tabular "sheet" store: every table is a header
/// row followed by data rows, and every cell is text. The store exposes exactly
/// two operations:
///
/// - [`SheetStore::read_all`]: load a whole table as an ordered list of rows
/// - [`SheetStore::overwrite_all`]: clear a table and write header + all rows
///
/// # Consistency
///
/// Every write replaces the entire table from an in-memory snapshot. There is
/// no version check, so two concurrent read-modify-write cycles race and the
/// last writer wins. This is an accepted trade-off for a small club with low
/// write concurrency.
///
/// # Backends
///
/// - [`memory::MemorySheetStore`]: process-local tables
/// - [`google::GoogleSheetsStore`]: Google Sheets REST API
/// - [`crate::db::sheet_store::PgSheetStore`]: PostgreSQL
///
/// # Example
///
/// ```
/// use clubtask_shared::store::{memory::MemorySheetStore, Row, Sheet, SheetStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemorySheetStore::new();
///
/// let mut sheet = Sheet::new(vec!["Name".to_string(), "Role".to_string()]);
/// sheet.push_row(Row::new().with("Name", "Ada").with("Role", "Dev"));
/// store.overwrite_all("Members", &sheet).await?;
///
/// let loaded = store.read_all("Members", &["Name", "Role"]).await?;
/// assert_eq!(loaded.rows()[0].get("Name"), Some("Ada"));
/// # Ok(())
/// # }
/// ```

pub mod cache;
pub mod google;
pub mod members;
pub mod memory;
pub mod tasks;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for sheet store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected the request
    #[error("Store backend error: {0}")]
    Backend(String),

    /// HTTP transport failure (Google Sheets backend)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Database failure (PostgreSQL backend)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backend returned data that could not be interpreted as a table
    #[error("Malformed sheet data: {0}")]
    Malformed(String),
}

/// A single data row: an order-preserving mapping of column name to cell text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    /// Creates an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Row::set`]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Returns the cell for `column`, if the row has one
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Sets the cell for `column`, replacing an existing value in place
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();

        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Iterates over `(column, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns true if every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.trim().is_empty())
    }
}

impl FromIterator<(String, String)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

/// A whole table: header columns plus ordered data rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Sheet {
    /// Creates an empty sheet with the given header
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates an empty sheet from a static default schema
    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect())
    }

    /// Builds a sheet from a raw grid (first row is the header)
    ///
    /// - Header cells are trimmed
    /// - Short rows are padded with empty cells, extra cells are dropped
    /// - Blank rows are skipped
    /// - A grid without data rows yields an empty sheet with `default_columns`
    pub fn from_grid(grid: Vec<Vec<String>>, default_columns: &[&str]) -> Self {
        let mut lines = grid.into_iter();

        let header: Vec<String> = match lines.next() {
            Some(header) => header.iter().map(|c| c.trim().to_string()).collect(),
            None => return Self::with_columns(default_columns),
        };

        let rows: Vec<Row> = lines
            .map(|cells| {
                header
                    .iter()
                    .enumerate()
                    .map(|(i, column)| {
                        (column.clone(), cells.get(i).cloned().unwrap_or_default())
                    })
                    .collect::<Row>()
            })
            .filter(|row| !row.is_blank())
            .collect();

        if rows.is_empty() || header.iter().all(|c| c.is_empty()) {
            return Self::with_columns(default_columns);
        }

        Self {
            columns: header,
            rows,
        }
    }

    /// Converts the sheet to a raw grid: header row followed by data rows
    ///
    /// Cells missing from a row are written as empty text.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.columns.clone());

        for row in &self.rows {
            grid.push(
                self.columns
                    .iter()
                    .map(|column| row.get(column).unwrap_or_default().to_string())
                    .collect(),
            );
        }

        grid
    }

    /// Header columns in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns true if the header contains `column`
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Appends a row, extending the header with any new columns
    pub fn push_row(&mut self, row: Row) {
        for (column, _) in row.iter() {
            if !self.has_column(column) {
                self.columns.push(column.to_string());
            }
        }
        self.rows.push(row);
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the sheet has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Tabular store holding whole tables
///
/// Implementations must be safe to share across request handlers.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Short backend label for logs and health output
    fn backend_name(&self) -> &str;

    /// Reads a whole table
    ///
    /// A missing or empty table yields an empty sheet with `default_columns`.
    async fn read_all(&self, table: &str, default_columns: &[&str]) -> Result<Sheet, StoreError>;

    /// Clears a table and writes the header plus every row of `sheet`
    ///
    /// Writing the same sheet twice leaves the table in the same state.
    async fn overwrite_all(&self, table: &str, sheet: &Sheet) -> Result<(), StoreError>;
}
