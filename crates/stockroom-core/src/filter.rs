//! # Filter Criteria
//!
//! Sparse read criteria for the inventory list screen.
//!
//! ## From Filter Dialog to Criteria
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Filter dialog (all inputs are text, any may be blank)                  │
//! │                                                                         │
//! │   category: "Hygiene"   brand: ""   quantity: "5"   comparator: "gte"  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ItemFilter::from_raw(...)        ItemFilter::parse_strict(...)         │
//! │  (forgiving: leading-integer      (reports InvalidNumericInput and     │
//! │   read, bad input drops the        UnknownComparator)                   │
//! │   quantity predicate)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ItemFilter {                                                           │
//! │     category: Some("Hygiene"),                                          │
//! │     brand:    None,             ← blank means "no constraint"          │
//! │     quantity: Some(>= 5),                                               │
//! │     search:   None,                                                     │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::InventoryItem;
use crate::validation::{parse_leading_integer, parse_quantity, ValidationResult};

// =============================================================================
// Quantity Comparator
// =============================================================================

/// How a quantity filter compares against the stored quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum QuantityComparator {
    /// `quantity = n`
    #[default]
    Eq,
    /// `quantity >= n`
    Gte,
    /// `quantity <= n`
    Lte,
    /// `quantity > n`
    Gt,
}

impl QuantityComparator {
    /// Wire name, as sent by the frontend.
    pub const fn as_str(&self) -> &'static str {
        match self {
            QuantityComparator::Eq => "eq",
            QuantityComparator::Gte => "gte",
            QuantityComparator::Lte => "lte",
            QuantityComparator::Gt => "gt",
        }
    }

    /// SQL operator for the `quantity` predicate.
    pub const fn sql_operator(&self) -> &'static str {
        match self {
            QuantityComparator::Eq => "=",
            QuantityComparator::Gte => ">=",
            QuantityComparator::Lte => "<=",
            QuantityComparator::Gt => ">",
        }
    }

    /// Parses comparator text as the filter dialog sends it.
    ///
    /// Only `eq`, `gte` and `lte` are recognized here. Anything else,
    /// `gt` included, is `None`.
    pub fn parse_lenient(text: &str) -> Option<Self> {
        match text.parse() {
            Ok(QuantityComparator::Gt) | Err(_) => None,
            Ok(comparator) => Some(comparator),
        }
    }

    pub fn matches(&self, stored: i64, wanted: i64) -> bool {
        match self {
            QuantityComparator::Eq => stored == wanted,
            QuantityComparator::Gte => stored >= wanted,
            QuantityComparator::Lte => stored <= wanted,
            QuantityComparator::Gt => stored > wanted,
        }
    }
}

impl FromStr for QuantityComparator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eq" => Ok(QuantityComparator::Eq),
            "gte" => Ok(QuantityComparator::Gte),
            "lte" => Ok(QuantityComparator::Lte),
            "gt" => Ok(QuantityComparator::Gt),
            _ => Err(ValidationError::UnknownComparator {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for QuantityComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Quantity Filter
// =============================================================================

/// A parsed quantity predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuantityFilter {
    pub value: i64,
    #[serde(default)]
    pub comparator: QuantityComparator,
}

// =============================================================================
// Item Filter
// =============================================================================

/// Sparse filter over inventory records. `None` fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Exact brand match.
    pub brand: Option<String>,
    pub quantity: Option<QuantityFilter>,
    /// Case-insensitive substring over name, brand and category.
    pub search: Option<String>,
}

impl ItemFilter {
    /// A filter that matches every record.
    pub fn all() -> Self {
        ItemFilter::default()
    }

    pub fn with_category(mut self, category: impl AsRef<str>) -> Self {
        self.category = non_blank(Some(category.as_ref()));
        self
    }

    pub fn with_brand(mut self, brand: impl AsRef<str>) -> Self {
        self.brand = non_blank(Some(brand.as_ref()));
        self
    }

    pub fn with_quantity(mut self, value: i64, comparator: QuantityComparator) -> Self {
        self.quantity = Some(QuantityFilter { value, comparator });
        self
    }

    pub fn with_search(mut self, term: impl AsRef<str>) -> Self {
        self.search = non_blank(Some(term.as_ref()));
        self
    }

    /// Builds a filter from raw dialog input, forgiving bad values.
    ///
    /// ## Rules
    /// - Blank or missing text means "no constraint"
    /// - Quantity text is read up to its first non-digit (`"5.5"` is `5`);
    ///   text with no leading digits drops the quantity predicate
    /// - Blank comparator means `eq`; unrecognized comparator text drops
    ///   the quantity predicate
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::{ItemFilter, QuantityComparator};
    ///
    /// let filter = ItemFilter::from_raw(Some("Food"), Some(""), Some("lots"), Some("gte"));
    /// assert_eq!(filter.category.as_deref(), Some("Food"));
    /// assert!(filter.brand.is_none());
    /// assert!(filter.quantity.is_none());
    ///
    /// let filter = ItemFilter::from_raw(None, None, Some("5.5"), Some("gte"));
    /// assert_eq!(filter, ItemFilter::all().with_quantity(5, QuantityComparator::Gte));
    /// ```
    pub fn from_raw(
        category: Option<&str>,
        brand: Option<&str>,
        quantity: Option<&str>,
        comparator: Option<&str>,
    ) -> Self {
        let comparator = match non_blank(comparator) {
            Some(text) => QuantityComparator::parse_lenient(&text),
            None => Some(QuantityComparator::default()),
        };

        let quantity = comparator.and_then(|comparator| {
            non_blank(quantity)
                .and_then(|text| parse_leading_integer(&text))
                .map(|value| QuantityFilter { value, comparator })
        });

        ItemFilter {
            category: non_blank(category),
            brand: non_blank(brand),
            quantity,
            search: None,
        }
    }

    /// Builds a filter from raw dialog input, reporting bad values.
    pub fn parse_strict(
        category: Option<&str>,
        brand: Option<&str>,
        quantity: Option<&str>,
        comparator: Option<&str>,
    ) -> ValidationResult<Self> {
        let comparator = match non_blank(comparator) {
            Some(text) => text.parse()?,
            None => QuantityComparator::default(),
        };

        let quantity = match non_blank(quantity) {
            Some(text) => Some(QuantityFilter {
                value: parse_quantity(&text)?,
                comparator,
            }),
            None => None,
        };

        Ok(ItemFilter {
            category: non_blank(category),
            brand: non_blank(brand),
            quantity,
            search: None,
        })
    }

    /// `true` when no field constrains the result.
    pub fn is_unconstrained(&self) -> bool {
        self.category.is_none()
            && self.brand.is_none()
            && self.quantity.is_none()
            && self.search.is_none()
    }

    /// In-memory evaluation of the filter against one record.
    ///
    /// Mirrors the SQL the query builder emits (binary equality for labels,
    /// ASCII case-insensitive substring for search).
    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(category) = &self.category {
            if &item.category != category {
                return false;
            }
        }

        if let Some(brand) = &self.brand {
            if &item.brand != brand {
                return false;
            }
        }

        if let Some(q) = &self.quantity {
            if !q.comparator.matches(item.quantity, q.value) {
                return false;
            }
        }

        if let Some(term) = &self.search {
            let term = term.to_ascii_lowercase();
            let hit = [&item.name, &item.brand, &item.category]
                .iter()
                .any(|field| field.to_ascii_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        true
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================
