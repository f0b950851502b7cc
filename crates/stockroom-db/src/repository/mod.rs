//! # Repository Module
//!
//! Repository implementations for the inventory store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Frontend command                                                      │
//! │       │                                                                 │
//! │       │  db.inventory().get_filtered(Some("Food"), None, Some("5"), ..) │
//! │       ▼                                                                 │
//! │  InventoryRepository                                                   │
//! │  ├── create / create_or_merge                                          │
//! │  ├── update / adjust_quantity / delete / clear                         │
//! │  ├── get_all / get_filtered / get_by_id / find_by_*                    │
//! │  └── list_distinct_categories / list_distinct_brands                   │
//! │       │                                                                 │
//! │       │  Database::pool() (opens on demand)                            │
//! │       ▼                                                                 │
//! │  SQLite `inventory` table                                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`InventoryRepository`](inventory::InventoryRepository) - Inventory CRUD,
//!   filtering and duplicate-aware writes

pub mod inventory;
