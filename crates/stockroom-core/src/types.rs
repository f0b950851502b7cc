//! # Domain Types
//!
//! Core domain types for the inventory store.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InventoryItem  │   │     NewItem     │   │  DuplicateKey   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64, PK)   │   │  name           │   │  name  (lower)  │       │
//! │  │  name           │   │  brand          │   │  brand (lower)  │       │
//! │  │  brand          │   │  category       │   │  category       │       │
//! │  │  category       │   │  quantity       │   │         (lower) │       │
//! │  │  quantity       │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  CreateOutcome  │   │  MergeOutcome   │                             │
//! │  │  Inserted(item) │   │  item           │                             │
//! │  │  Duplicate(item)│   │  merged: bool   │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Empty vs Missing
//! Brand and category are optional. Both are represented as `String`, with
//! the empty string meaning "not set", so the duplicate key is always a
//! plain string triple.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::validation;

/// Primary key of an inventory record, assigned by the store.
pub type ItemId = i64;

// =============================================================================
// Inventory Item
// =============================================================================

/// A stored inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Store-assigned identifier, stable for the record's lifetime.
    pub id: ItemId,

    /// Display name, never empty.
    pub name: String,

    /// Brand, empty when not set.
    pub brand: String,

    /// Category, empty when not set.
    pub category: String,

    /// Units on hand, never negative.
    pub quantity: i64,
}

impl InventoryItem {
    /// Returns the case-insensitive identity used for duplicate detection.
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::new(&self.name, &self.brand, &self.category)
    }

    /// Returns the four mutable fields, e.g. to prefill an edit form.
    pub fn fields(&self) -> NewItem {
        NewItem {
            name: self.name.clone(),
            brand: self.brand.clone(),
            category: self.category.clone(),
            quantity: self.quantity,
        }
    }

    /// Quantity after applying `delta`, rejecting results below zero.
    pub fn adjusted_quantity(&self, delta: i64) -> CoreResult<i64> {
        validation::apply_quantity_delta(self.id, self.quantity, delta)
    }
}

// =============================================================================
// New Item
// =============================================================================

/// The mutable fields of a record, as submitted for create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    pub quantity: i64,
}

impl NewItem {
    /// Creates a new item payload.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::NewItem;
    ///
    /// let item = NewItem::new("Rice", "Tio João", "Food", 2);
    /// assert_eq!(item.quantity, 2);
    /// ```
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        category: impl Into<String>,
        quantity: i64,
    ) -> Self {
        NewItem {
            name: name.into(),
            brand: brand.into(),
            category: category.into(),
            quantity,
        }
    }

    /// Returns a copy with surrounding whitespace trimmed from every text field.
    pub fn normalized(&self) -> Self {
        NewItem {
            name: self.name.trim().to_string(),
            brand: self.brand.trim().to_string(),
            category: self.category.trim().to_string(),
            quantity: self.quantity,
        }
    }

    /// Returns the case-insensitive identity used for duplicate detection.
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::new(&self.name, &self.brand, &self.category)
    }
}

// =============================================================================
// Duplicate Key
// =============================================================================

/// Normalized (name, brand, category) triple.
///
/// Trimmed and ASCII-lowercased, which is what SQLite's built-in `lower()`
/// does, so a key computed here agrees with the store's unique index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub name: String,
    pub brand: String,
    pub category: String,
}

impl DuplicateKey {
    pub fn new(name: &str, brand: &str, category: &str) -> Self {
        DuplicateKey {
            name: name.trim().to_ascii_lowercase(),
            brand: brand.trim().to_ascii_lowercase(),
            category: category.trim().to_ascii_lowercase(),
        }
    }
}

// =============================================================================
// Write Outcomes
// =============================================================================

/// Result of a duplicate-aware create.
///
/// Duplicate detection surfaces the conflict, it does not resolve it: on
/// `Duplicate` the store is untouched and the caller decides whether to
/// follow up with an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "item", rename_all = "camelCase")]
pub enum CreateOutcome {
    /// No matching record existed; this is the new row.
    Inserted(InventoryItem),
    /// A record with the same duplicate key already exists.
    Duplicate(InventoryItem),
}

impl CreateOutcome {
    /// The pre-existing record, if the create hit a duplicate.
    pub fn existing(&self) -> Option<&InventoryItem> {
        match self {
            CreateOutcome::Duplicate(item) => Some(item),
            CreateOutcome::Inserted(_) => None,
        }
    }

    /// The record the outcome refers to, new or existing.
    pub fn item(&self) -> &InventoryItem {
        match self {
            CreateOutcome::Inserted(item) | CreateOutcome::Duplicate(item) => item,
        }
    }

    pub fn into_item(self) -> InventoryItem {
        match self {
            CreateOutcome::Inserted(item) | CreateOutcome::Duplicate(item) => item,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, CreateOutcome::Duplicate(_))
    }
}

/// Result of an insert-or-add-quantity write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// The record as stored after the write.
    pub item: InventoryItem,
    /// `true` when the quantity was added to an existing record.
    pub merged: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
