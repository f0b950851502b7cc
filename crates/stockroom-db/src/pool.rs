//! # Storage Handle
//!
//! Owns the lifecycle of the SQLite connection pool.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storage Handle Lifecycle                           │
//! │                                                                         │
//! │  Database::new(config)        ← no I/O yet, state = Closed             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  open()  or first repository call                                      │
//! │       │                                                                 │
//! │       ├── Already open? → no-op                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  create parent dir → connect (WAL, NORMAL sync) → run migrations       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  state = Open(SqlitePool)     ← shared by every clone of the handle    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  close()                      ← pool drained, state = Closed           │
//! │       │                                                                 │
//! │       └── next repository call re-opens on demand                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled on every connection:
//! - Readers don't block writers
//! - Writers don't block readers
//! - Better crash recovery

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::inventory::InventoryRepository;

/// The storage handle: one lazily-opened pool, shared by all repositories.
///
/// Cloning is cheap and every clone refers to the same connection state, so
/// `open()` from one call site is visible to all others.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./inventory.db"));
///
/// // Optional: operations open on demand
/// db.open().await?;
///
/// let items = db.inventory().get_all().await?;
///
/// db.close().await;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    config: Arc<DbConfig>,
    pool: Arc<RwLock<Option<SqlitePool>>>,
}

impl Database {
    /// Creates a closed handle. No I/O happens until [`Database::open`] or
    /// the first repository call.
    pub fn new(config: DbConfig) -> Self {
        Database {
            config: Arc::new(config),
            pool: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a handle and opens it immediately.
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use, schema in place
    /// * `Err(DbError::StorageUnavailable)` - Connection or migration failed
    pub async fn connect(config: DbConfig) -> DbResult<Self> {
        let db = Database::new(config);
        db.open().await?;
        Ok(db)
    }

    /// Opens the store if it isn't already open.
    ///
    /// ## What This Does
    /// 1. Creates the database file (and parent directory) if missing
    /// 2. Configures SQLite:
    ///    - WAL journal mode
    ///    - NORMAL synchronous
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled), which create the inventory table
    ///
    /// Idempotent and safe to call concurrently: only one pool is ever
    /// created per open/close cycle.
    pub async fn open(&self) -> DbResult<()> {
        self.pool().await.map(|_| ())
    }

    /// Closes the pool. Idempotent.
    ///
    /// A repository call after `close` opens the store again.
    pub async fn close(&self) {
        let pool = self.pool.write().await.take();

        match pool {
            Some(pool) => {
                info!("Closing database connection pool");
                pool.close().await;
            }
            None => debug!("Database already closed"),
        }
    }

    /// `true` while a pool is held.
    pub async fn is_open(&self) -> bool {
        self.pool.read().await.is_some()
    }

    /// Returns the open pool, opening the store first if needed.
    pub(crate) async fn pool(&self) -> DbResult<SqlitePool> {
        {
            let guard = self.pool.read().await;
            if let Some(pool) = guard.as_ref() {
                return Ok(pool.clone());
            }
        }

        let mut guard = self.pool.write().await;

        // Another caller may have opened it while we waited for the lock
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        let pool = self.establish().await?;
        *guard = Some(pool.clone());
        Ok(pool)
    }

    async fn establish(&self) -> DbResult<SqlitePool> {
        let config = &self.config;

        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::StorageUnavailable(e.to_string()))?
        } else {
            if let Some(parent) = config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        DbError::StorageUnavailable(format!(
                            "cannot create {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }

            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
        };

        let connect_options = connect_options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);

        if config.is_in_memory() {
            pool_options = pool_options.max_lifetime(None::<Duration>);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::StorageUnavailable(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        if config.run_migrations {
            info!("Running database migrations");
            if let Err(err) = migrations::run_migrations(&pool).await {
                pool.close().await;
                return Err(err);
            }
            info!("Migrations complete");
        }

        Ok(pool)
    }

    /// Runs database migrations against the (opened on demand) store.
    ///
    /// ## When To Call
    /// - Automatically called on open if `run_migrations` is true
    /// - Manually when migrations are disabled in config
    pub async fn run_migrations(&self) -> DbResult<()> {
        let pool = self.pool().await?;
        migrations::run_migrations(&pool).await
    }

    /// Checks if the database is healthy (can execute queries).
    ///
    /// Opens the store if needed.
    pub async fn health_check(&self) -> bool {
        match self.pool().await {
            Ok(pool) => sqlx::query("SELECT 1").execute(&pool).await.is_ok(),
            Err(_) => false,
        }
    }

    /// The configuration this handle was built from.
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Returns the inventory repository bound to this handle.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let outcome = db.inventory().create(&NewItem::new("Soap", "Dove", "Hygiene", 10)).await?;
    /// ```
    pub fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new(self.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();

        assert!(db.is_open().await);
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_new_does_not_open() {
        let db = Database::new(DbConfig::in_memory());
        assert!(!db.is_open().await);

        db.open().await.unwrap();
        assert!(db.is_open().await);
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let db = Database::new(DbConfig::in_memory());
        db.open().await.unwrap();

        sqlx::query("INSERT INTO inventory (name, brand, category, quantity) VALUES ('Salt', '', '', 1)")
            .execute(&db.pool().await.unwrap())
            .await
            .unwrap();

        // A second open must not swap the pool (which would lose the in-memory row)
        db.open().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
            .fetch_one(&db.pool().await.unwrap())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_reopens_on_demand() {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();

        db.close().await;
        db.close().await;
        assert!(!db.is_open().await);

        assert!(db.health_check().await);
        assert!(db.is_open().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let db = Database::new(DbConfig::in_memory());
        let other = db.clone();

        db.open().await.unwrap();
        assert!(other.is_open().await);

        other.close().await;
        assert!(!db.is_open().await);
    }

    #[tokio::test]
    async fn test_concurrent_open_creates_one_pool() {
        let db = Database::new(DbConfig::in_memory());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { db.open().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        sqlx::query("INSERT INTO inventory (name, brand, category, quantity) VALUES ('Salt', '', '', 1)")
            .execute(&db.pool().await.unwrap())
            .await
            .unwrap();
        db.open().await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
            .fetch_one(&db.pool().await.unwrap())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_open_file_based_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("inventory.db");

        let db = Database::connect(DbConfig::new(&db_path)).await.unwrap();
        assert!(db.health_check().await);
        assert!(db_path.exists());

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&db.pool().await.unwrap())
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        db.close().await;
    }

    #[tokio::test]
    async fn test_unopenable_path_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let db = Database::new(DbConfig::new(blocker.join("inventory.db")));
        let err = db.open().await.unwrap_err();
        assert!(err.is_storage_unavailable());
        assert!(!db.is_open().await);

        // Still failing the same way on the next attempt
        assert!(db.open().await.unwrap_err().is_storage_unavailable());
        assert!(!db.health_check().await);
    }
}
