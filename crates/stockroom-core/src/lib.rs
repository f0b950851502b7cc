//! # stockroom-core: Pure Inventory Logic for Stockroom
//!
//! This crate holds the domain side of the inventory data-access layer:
//! record types, input normalization, duplicate-key rules, filter criteria
//! and validation. None of it touches storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Mobile Frontend (TypeScript)                    │   │
//! │  │    Item list ──► Filter dialog ──► Add/Edit modal               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ repository calls                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockroom-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐               │   │
//! │  │   │   types    │  │   filter   │  │ validation │               │   │
//! │  │   │ Inventory  │  │ ItemFilter │  │   rules    │               │   │
//! │  │   │   Item     │  │ Comparator │  │  coercion  │               │   │
//! │  │   └────────────┘  └────────────┘  └────────────┘               │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • PURE FUNCTIONS                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-db (Database Layer)                   │   │
//! │  │        Storage handle, query builder, inventory repository      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `InventoryItem`, `NewItem`, `DuplicateKey`
//! - [`filter`] - Sparse read criteria (`ItemFilter`, `QuantityComparator`)
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules and numeric input parsing
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::NewItem;
//!
//! let first = NewItem::new("Soap", "Dove", "Hygiene", 10);
//! let second = NewItem::new("soap", " dove ", "HYGIENE", 5);
//!
//! // Same record as far as duplicate detection is concerned
//! assert_eq!(first.duplicate_key(), second.duplicate_key());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod filter;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use filter::{ItemFilter, QuantityComparator, QuantityFilter};
pub use types::*;
