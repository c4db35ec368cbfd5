//! # Validation Module
//!
//! Input validation for ledger operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host application                                             │
//! │  ├── Form checks, sufficient-funds policy for withdrawals              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (quetzal-ledger calls it before any write)       │
//! │  ├── Amount strictly positive                                          │
//! │  └── Concept present and bounded                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (amount_cents > 0)                                          │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note what is deliberately NOT here: a sufficient-funds check. The ledger
//! records negative balances; withdrawal policy belongs to the caller.

use crate::error::ValidationError;
use crate::MAX_CONCEPT_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a movement amount in centavos.
///
/// ## Rules
/// - Must be strictly positive (the sign lives in the direction)
///
/// ## Example
/// ```rust
/// use quetzal_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents(500).is_ok());
/// assert!(validate_amount_cents(0).is_err());
/// assert!(validate_amount_cents(-500).is_err());
/// ```
pub fn validate_amount_cents(amount_cents: i64) -> ValidationResult<()> {
    if amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a movement concept.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most [`MAX_CONCEPT_LEN`] characters
///
/// ## Example
/// ```rust
/// use quetzal_core::validation::validate_concept;
///
/// assert!(validate_concept("Venta #123").is_ok());
/// assert!(validate_concept("   ").is_err());
/// assert!(validate_concept(&"x".repeat(51)).is_err());
/// ```
pub fn validate_concept(concept: &str) -> ValidationResult<()> {
    let concept = concept.trim();

    if concept.is_empty() {
        return Err(ValidationError::Required {
            field: "concept".to_string(),
        });
    }

    if concept.chars().count() > MAX_CONCEPT_LEN {
        return Err(ValidationError::TooLong {
            field: "concept".to_string(),
            max: MAX_CONCEPT_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
