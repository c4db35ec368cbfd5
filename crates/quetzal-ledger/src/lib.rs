//! # quetzal-ledger: Cash Ledger Engine for Quetzal POS
//!
//! This crate implements the cash-register business rules on top of
//! [`quetzal_db`]: recording movements, closing days, and the background
//! scheduler that keeps every past day closed.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cash Ledger Architecture                           │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 ClosingScheduler (Background Task)               │  │
//! │  │                                                                  │  │
//! │  │  Spawned as a Tokio task at startup                              │  │
//! │  │  Ticks on an interval, runs after a configured hour (UTC)        │  │
//! │  │  Single entry point for automatic closings                       │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ LedgerService  │  │   DayCloser    │  │  Repositories          │    │
//! │  │                │  │                │  │  (quetzal-db)          │    │
//! │  │ Validates and  │  │ Opening = prev │  │                        │    │
//! │  │ records income │  │ day's closing  │  │ Movements, closings,   │    │
//! │  │ and expense    │  │ Closing = op + │  │ registers, users       │    │
//! │  │ movements      │  │ income - exp.  │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  INVARIANTS:                                                           │
//! │  • Every movement stores the register balance after itself             │
//! │  • A closed daily record is terminal and never rewritten               │
//! │  • Each register closes at most once per calendar date                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`closing`] - `DayCloser`: computes and persists one day's record
//! - [`error`] - Ledger error types
//! - [`scheduler`] - `ClosingScheduler`: background catch-up closing loop
//! - [`service`] - `LedgerService`: movement recording and period queries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quetzal_db::{Database, DbConfig};
//! use quetzal_ledger::{ClosingScheduler, LedgerService, SchedulerConfig};
//!
//! let db = Database::new(DbConfig::new("quetzal.db")).await?;
//!
//! // Record a sale
//! let service = LedgerService::new(db.clone());
//! service
//!     .record_movement("reg-1", MovementDirection::Income,
//!                      Money::from_cents(10_000), "Venta mostrador",
//!                      "user-1", None)
//!     .await?;
//!
//! // Keep past days closed in the background
//! let scheduler = ClosingScheduler::new(db, SchedulerConfig::default());
//! let handle = scheduler.spawn();
//! // ...
//! handle.shutdown().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod closing;
pub mod error;
pub mod scheduler;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use closing::{BatchOutcome, DayCloser};
pub use error::{LedgerError, LedgerResult};
pub use scheduler::{ClosingPassSummary, ClosingScheduler, SchedulerConfig, SchedulerHandle};
pub use service::LedgerService;
