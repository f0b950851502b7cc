//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Inventory rule violations                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Storage failures, wraps CoreError              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → frontend                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Inventory rule violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A quantity change would leave the item below zero.
    ///
    /// ## When This Occurs
    /// - Taking 5 units out of an item that holds 3
    #[error("Insufficient quantity for item {id}: available {available}, requested {requested}")]
    InsufficientQuantity {
        id: i64,
        available: i64,
        requested: i64,
    },

    /// A quantity change does not fit in a 64-bit integer.
    #[error("Quantity overflow for item {id}")]
    QuantityOverflow { id: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet the record invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Quantity below zero.
    #[error("{field} cannot be negative (got {value})")]
    NegativeQuantity { field: String, value: i64 },

    /// Text that should hold an integer does not.
    #[error("{field} is not a valid integer: '{value}'")]
    InvalidNumericInput { field: String, value: String },

    /// Comparator text outside of `eq`, `gte`, `lte`, `gt`.
    #[error("Unknown quantity comparator '{value}' (expected one of eq, gte, lte, gt)")]
    UnknownComparator { value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientQuantity {
            id: 7,
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient quantity for item 7: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::InvalidNumericInput {
            field: "quantity".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "quantity is not a valid integer: 'abc'");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
