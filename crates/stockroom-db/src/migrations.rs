//! # Database Migrations
//!
//! Embedded SQL migrations for the inventory store.
//!
//! ## Schema History
//! ```text
//! migrations/sqlite/
//! ├── 001_create_inventory.sql        inventory table + name index
//! ├── 002_inventory_duplicate_key.sql folds legacy duplicates, then adds
//! │                                   UNIQUE (lower(name), lower(brand), lower(category))
//! └── 003_trim_duplicate_key.sql      same key with trim() applied, refolding
//!                                     rows that only differ by surrounding spaces
//! ```
//!
//! Never edit an applied migration. Add the next numbered file instead.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

/// Migrations embedded at compile time from `migrations/sqlite`.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// Idempotent. Each migration runs in its own transaction, in file order.
/// Failures surface as [`DbError::StorageUnavailable`](crate::DbError::StorageUnavailable).
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!(
        migrations = MIGRATOR.migrations.len(),
        "Schema up to date"
    );
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)`.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((total, usize::try_from(applied).unwrap_or_default()))
}
