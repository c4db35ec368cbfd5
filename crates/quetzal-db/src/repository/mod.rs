//! # Repository Module
//!
//! Repository implementations for database access.
//!
//! ## Repository Pattern
//! Each repository:
//! - Owns a clone of the connection pool (cheap, reference-counted)
//! - Provides typed methods for one table (plus its cross-table invariants)
//! - Returns `DbResult<T>` for all operations
//!
//! ## Write-Path Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Table            Written by                                            │
//! │  ───────────────  ───────────────────────────────────────────────────  │
//! │  registers        MovementRepository::record (balance),                │
//! │                   ClosingRepository::record_closed (balance push),     │
//! │                   RegisterRepository (create / activate)               │
//! │  movements        MovementRepository::record ONLY (append-only)        │
//! │  daily_closings   ClosingRepository (upserts, closed is terminal)      │
//! │  users            UserRepository                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod closing;
pub mod movement;
pub mod register;
pub mod user;
