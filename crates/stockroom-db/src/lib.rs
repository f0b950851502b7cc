//! # stockroom-db: Database Layer for Stockroom
//!
//! Local inventory storage on SQLite, with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  Inventory screen / filter dialog                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockroom-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repository   │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │(inventory.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ open / close  │◄───│ InventoryRepo │    │ 001_create   │  │   │
//! │  │   │ SqlitePool    │    │   query.rs    │    │ 002_dup_key  │  │   │
//! │  │   │               │    │               │    │ 003_trim_key │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   <platform data dir>/inventory.db                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Storage settings, environment overrides
//! - [`pool`] - The storage handle and its open/close lifecycle
//! - [`migrations`] - Embedded database migrations
//! - [`query`] - Filtered query construction
//! - [`error`] - Database error types
//! - [`repository`] - The inventory repository
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_core::NewItem;
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env());
//!
//! let outcome = db.inventory().create(&NewItem::new("Soap", "Dove", "Hygiene", 10)).await?;
//! let hygiene = db.inventory().get_filtered(Some("Hygiene"), None, None, None).await?;
//!
//! db.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod query;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::DbConfig;
pub use error::{DbError, DbResult};
pub use pool::Database;

pub use repository::inventory::InventoryRepository;
