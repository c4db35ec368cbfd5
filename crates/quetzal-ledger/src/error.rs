//! # Ledger Error Types
//!
//! Error types for movement recording and daily closing operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Ledger Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Domain       │  │   Concurrency   │  │      Storage            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │ InvalidAmount   │  │ Conflict        │  │  Db (wraps DbError)     │ │
//! │  │ RegisterNotFound│  │                 │  │  Channel                │ │
//! │  │ Validation      │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Domain errors surface via quetzal-core's CoreError so callers see     │
//! │  one taxonomy whether the check fired before or inside the database.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use quetzal_core::CoreError;
use quetzal_db::DbError;

/// Result type alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger error type covering movement and closing failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Domain rule violation (invalid amount, unknown register, bad concept).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Two writers raced on the same register; the operation was rolled back
    /// and is safe to retry.
    #[error("Concurrent ledger write conflict: {0}")]
    ConcurrencyConflict(String),

    /// Underlying database failure.
    #[error("Database error: {0}")]
    Db(DbError),

    /// A control channel to a background task was closed.
    #[error("Channel error: {0}")]
    Channel(String),
}

impl From<DbError> for LedgerError {
    /// Lifts storage errors into the ledger taxonomy.
    ///
    /// Register lookups that miss and write conflicts both have domain
    /// meaning here, so they map to their dedicated variants instead of
    /// hiding inside [`LedgerError::Db`].
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { ref entity, ref id } if entity == "Register" => {
                LedgerError::Core(CoreError::RegisterNotFound(id.clone()))
            }
            DbError::ConcurrencyConflict(message) => LedgerError::ConcurrencyConflict(message),
            other => LedgerError::Db(other),
        }
    }
}

impl LedgerError {
    /// True when retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::ConcurrencyConflict(_))
    }
}
