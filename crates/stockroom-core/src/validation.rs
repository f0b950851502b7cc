//! # Validation Module
//!
//! Input validation and numeric parsing for inventory records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  └── Text inputs, quantity typed as text                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── parse_quantity / coerce_quantity (text → integer)                 │
//! │  ├── parse_leading_integer (filter text → integer prefix)              │
//! │  └── validate_item (name required, quantity ≥ 0)                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL name                                                     │
//! │  └── UNIQUE duplicate-key index                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{coerce_quantity, parse_quantity};
//!
//! assert_eq!(parse_quantity(" 12 ").unwrap(), 12);
//! assert!(parse_quantity("twelve").is_err());
//!
//! // Edit forms are forgiving: bad input becomes zero
//! assert_eq!(coerce_quantity("twelve"), 0);
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{ItemId, NewItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item name.
///
/// Must not be empty after trimming. There is no upper length limit.
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stored quantity. Zero is allowed, negatives are not.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::NegativeQuantity {
            field: "quantity".to_string(),
            value: quantity,
        });
    }

    Ok(())
}

/// Parses integer text, as typed into a quantity field.
///
/// Surrounding whitespace is ignored. Anything else that isn't a base-10
/// integer (`"5.5"`, `"12abc"`, `""`) is `InvalidNumericInput`.
pub fn parse_quantity(text: &str) -> ValidationResult<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidNumericInput {
            field: "quantity".to_string(),
            value: text.to_string(),
        })
}

/// Reads the integer at the start of `text`, ignoring whatever follows.
///
/// Leading whitespace and one `+`/`-` sign are accepted, then the leading
/// run of ASCII digits is taken: `"5.5"` reads as `5`, `"12abc"` as `12`.
/// Returns `None` when no digit follows, or when the digits overflow `i64`.
pub fn parse_leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    if digits == 0 {
        return None;
    }

    let sign_len = text.len() - unsigned.len();
    text[..sign_len + digits].parse::<i64>().ok()
}

/// Forgiving quantity parse for editable fields.
///
/// Unparsable or negative text becomes `0`.
pub fn coerce_quantity(text: &str) -> i64 {
    parse_quantity(text).map(|q| q.max(0)).unwrap_or(0)
}

/// Applies a relative change to a stored quantity.
///
/// ## Rules
/// - The result may be zero but never negative
/// - Overflow is reported, not wrapped
pub fn apply_quantity_delta(id: ItemId, current: i64, delta: i64) -> CoreResult<i64> {
    let next = current
        .checked_add(delta)
        .ok_or(CoreError::QuantityOverflow { id })?;

    if next < 0 {
        return Err(CoreError::InsufficientQuantity {
            id,
            available: current,
            requested: delta.saturating_neg(),
        });
    }

    Ok(next)
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates the fields of a create/update payload.
///
/// Call on the normalized item; see [`NewItem::normalized`].
pub fn validate_item(item: &NewItem) -> ValidationResult<()> {
    validate_item_name(&item.name)?;
    validate_quantity(item.quantity)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
