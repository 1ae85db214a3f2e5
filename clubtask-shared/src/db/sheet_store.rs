/// PostgreSQL sheet store
///
/// Stores each sheet as a header row plus numbered data rows:
///
/// ```sql
/// CREATE TABLE sheet_headers (
///     sheet TEXT PRIMARY KEY,
///     columns JSONB NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE sheet_rows (
///     sheet TEXT NOT NULL,
///     position INTEGER NOT NULL,
///     cells JSONB NOT NULL,
///     PRIMARY KEY (sheet, position)
/// );
/// ```
///
/// An overwrite deletes and re-inserts the sheet inside one transaction, so a
/// reader never sees a half-written table. Concurrent overwrites still race:
/// the last commit wins.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;

use crate::store::{Sheet, SheetStore, StoreError};

/// Sheet store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgSheetStore {
    pool: PgPool,
}

impl PgSheetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SheetStore for PgSheetStore {
    fn backend_name(&self) -> &str {
        "postgres"
    }

    async fn read_all(&self, table: &str, default_columns: &[&str]) -> Result<Sheet, StoreError> {
        let header: Option<Json<Vec<String>>> =
            sqlx::query_scalar("SELECT columns FROM sheet_headers WHERE sheet = $1")
                .bind(table)
                .fetch_optional(&self.pool)
                .await?;

        let Some(Json(header)) = header else {
            return Ok(Sheet::with_columns(default_columns));
        };

        let rows: Vec<Json<Vec<String>>> =
            sqlx::query_scalar("SELECT cells FROM sheet_rows WHERE sheet = $1 ORDER BY position")
                .bind(table)
                .fetch_all(&self.pool)
                .await?;

        let mut grid = Vec::with_capacity(rows.len() + 1);
        grid.push(header);
        grid.extend(rows.into_iter().map(|Json(cells)| cells));

        Ok(Sheet::from_grid(grid, default_columns))
    }

    async fn overwrite_all(&self, table: &str, sheet: &Sheet) -> Result<(), StoreError> {
        let mut grid = sheet.to_grid().into_iter();
        let header = grid.next().unwrap_or_default();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sheet_rows WHERE sheet = $1")
            .bind(table)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO sheet_headers (sheet, columns, updated_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (sheet) DO UPDATE SET columns = EXCLUDED.columns, updated_at = NOW()",
        )
        .bind(table)
        .bind(Json(header))
        .execute(&mut *tx)
        .await?;

        for (position, cells) in grid.enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::Malformed(format!("too many rows in {}", table)))?;

            sqlx::query("INSERT INTO sheet_rows (sheet, position, cells) VALUES ($1, $2, $3)")
                .bind(table)
                .bind(position)
                .bind(Json(cells))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(table, rows = sheet.len(), "Sheet overwritten in PostgreSQL");
        Ok(())
    }
}
