//! # Error Types
//!
//! Domain-specific error types for quetzal-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quetzal-core errors (this file)                                       │
//! │  ├── CoreError        - Ledger domain errors                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  quetzal-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  quetzal-ledger errors (engine crate)                                  │
//! │  └── LedgerError      - What the host application sees                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → host application    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (register id, amount, date)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger domain errors.
///
/// These represent business rule violations. They should be caught and
/// translated to user-friendly messages by the host application.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A movement amount must be strictly positive.
    ///
    /// ## When This Occurs
    /// - `record_movement` called with amount <= 0
    /// - Direction carries the sign; a "negative income" is an expense
    #[error("Invalid movement amount: {amount_cents} centavos (must be > 0)")]
    InvalidAmount { amount_cents: i64 },

    /// Register cannot be found.
    #[error("Register not found: {0}")]
    RegisterNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before any persistence work runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
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
        let err = CoreError::InvalidAmount { amount_cents: -500 };
        assert_eq!(
            err.to_string(),
            "Invalid movement amount: -500 centavos (must be > 0)"
        );

        let err = CoreError::RegisterNotFound("caja-1".to_string());
        assert_eq!(err.to_string(), "Register not found: caja-1");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "concept".to_string(),
        };
        assert_eq!(err.to_string(), "concept is required");

        let err = ValidationError::TooLong {
            field: "concept".to_string(),
            max: 50,
        };
        assert_eq!(err.to_string(), "concept must be at most 50 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
