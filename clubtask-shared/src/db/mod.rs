/// PostgreSQL layer for ClubTask
///
/// Used only when the `postgres` store backend is selected. Tables are kept
/// in the same header + rows shape as a spreadsheet so that the PostgreSQL
/// backend is a drop-in [`crate::store::SheetStore`].
///
/// # Modules
///
/// - `pool`: Connection pool creation and health checks
/// - `migrations`: Embedded migration runner
/// - `sheet_store`: [`sheet_store::PgSheetStore`]
///
/// # Example
///
/// ```no_run
/// use clubtask_shared::db::pool::{create_pool, DatabaseConfig};
/// use clubtask_shared::db::migrations::run_migrations;
/// use clubtask_shared::db::sheet_store::PgSheetStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
///     run_migrations(&pool).await?;
///
///     let store = PgSheetStore::new(pool);
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
pub mod sheet_store;
