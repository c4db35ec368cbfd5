//! # Domain Types
//!
//! Core domain types for the cash-register ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Register     │   │    Movement     │   │  DailyClosing   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  register_id    │   │  register_id    │       │
//! │  │  balance_cents  │   │  direction      │   │  date           │       │
//! │  │  active         │   │  amount_cents   │   │  opening_cents  │       │
//! │  └─────────────────┘   │  balance_after  │   │  closing_cents  │       │
//! │                        └─────────────────┘   │  closed         │       │
//! │  ┌─────────────────┐                         └─────────────────┘       │
//! │  │MovementDirection│   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ─────────────  │   │      User       │   │    DayTotals    │       │
//! │  │  Income         │   │  (existence     │   │  (grouped day   │       │
//! │  │  Expense        │   │   directory)    │   │   aggregate)    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle Rules
//! - A `Movement` is created exactly once and never updated or deleted;
//!   corrections are offsetting movements linked via `reference_id`.
//! - A `DailyClosing` goes absent → open → closed. Closed is terminal.
//! - `Register.balance_cents` is written only by the ledger writer and the
//!   day closer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Movement Direction
// =============================================================================

/// The direction of a cash movement: into or out of the drawer.
///
/// Stored in SQLite as lowercase text (`income` / `expense`); the legacy
/// system used single letters `I` / `E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    /// Cash in: sale, deposit, reversal of an expense.
    Income,
    /// Cash out: withdrawal, refund, annulled sale.
    Expense,
}

impl MovementDirection {
    /// Applies this direction's sign to a positive amount.
    ///
    /// ## Example
    /// ```rust
    /// use quetzal_core::{Money, MovementDirection};
    ///
    /// let amount = Money::from_cents(500);
    /// assert_eq!(MovementDirection::Income.signed(amount).cents(), 500);
    /// assert_eq!(MovementDirection::Expense.signed(amount).cents(), -500);
    /// ```
    #[inline]
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            MovementDirection::Income => amount,
            MovementDirection::Expense => -amount,
        }
    }
}

impl std::fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementDirection::Income => write!(f, "income"),
            MovementDirection::Expense => write!(f, "expense"),
        }
    }
}

// =============================================================================
// Register
// =============================================================================

/// A cash register ("caja"): one drawer tracked independently with its own
/// running balance.
///
/// The schema allows many registers; most deployments run a single
/// "principal" one. `balance_cents` is the live balance and agrees with the
/// last movement's snapshot until a daily closing adjusts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Register {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name ("Caja Principal").
    pub name: String,

    /// Live running balance in centavos.
    pub balance_cents: i64,

    /// Inactive registers are skipped by the closing scheduler.
    pub active: bool,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Register {
    /// The live balance as `Money`.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

// =============================================================================
// Movement
// =============================================================================

/// One signed balance-affecting event on a register.
///
/// ## Snapshot Pattern
/// `balance_after_cents` stores the register balance immediately after this
/// movement was applied. Replaying the movement log in timestamp order must
/// reproduce every snapshot exactly - this is what makes the nightly
/// reconciliation a pure comparison instead of a judgement call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning register.
    pub register_id: String,

    /// Income or expense.
    pub direction: MovementDirection,

    /// Positive amount in centavos. The sign lives in `direction`.
    pub amount_cents: i64,

    /// When the movement was recorded (UTC).
    pub occurred_at: DateTime<Utc>,

    /// Free-text concept ("Venta #123", "Retiro para depósito").
    pub concept: String,

    /// Optional link to the originating business record (e.g. a sale id).
    /// An annulled sale's reversing Expense references the original here.
    pub reference_id: Option<String>,

    /// Acting user.
    pub user_id: String,

    /// Register balance immediately after this movement was applied.
    pub balance_after_cents: i64,
}

impl Movement {
    /// The movement amount as `Money` (always positive).
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// The amount with the direction's sign applied.
    #[inline]
    pub fn signed_amount(&self) -> Money {
        self.direction.signed(self.amount())
    }

    /// The balance snapshot as `Money`.
    #[inline]
    pub fn balance_after(&self) -> Money {
        Money::from_cents(self.balance_after_cents)
    }
}

// =============================================================================
// Daily Closing
// =============================================================================

/// The end-of-day reconciliation record for one (register, calendar date).
///
/// Unique per (register_id, date). While `closed` is true the arithmetic
/// invariant holds: `closing = opening + income - expense`. A closed row is
/// terminal; the scheduler never re-closes or re-opens it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DailyClosing {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning register.
    pub register_id: String,

    /// Calendar date this row reconciles (date-only precision).
    pub date: NaiveDate,

    /// Balance at the start of the date.
    pub opening_cents: i64,

    /// Balance at the end of the date.
    pub closing_cents: i64,

    /// Sum of income-direction amounts for the date.
    pub income_cents: i64,

    /// Sum of expense-direction amounts for the date.
    pub expense_cents: i64,

    /// Whether the date is closed. Terminal once true.
    pub closed: bool,

    /// When the closing was performed.
    pub closed_at: Option<DateTime<Utc>>,

    /// User recorded as having performed the closing.
    pub closed_by: Option<String>,
}

impl DailyClosing {
    /// The opening balance as `Money`.
    #[inline]
    pub fn opening(&self) -> Money {
        Money::from_cents(self.opening_cents)
    }

    /// The closing balance as `Money`.
    #[inline]
    pub fn closing(&self) -> Money {
        Money::from_cents(self.closing_cents)
    }

    /// Checks the closed-row arithmetic invariant.
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.closing_cents == self.opening_cents + self.income_cents - self.expense_cents
    }
}

// =============================================================================
// User
// =============================================================================

/// A user of the system.
///
/// The ledger only needs an existence directory: movements and closings
/// record who acted. Authentication lives in the host application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login name.
    pub username: String,

    /// Display name.
    pub full_name: String,

    /// Inactive users cannot be resolved as closing users.
    pub active: bool,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Day Totals
// =============================================================================

/// Per-register movement totals for one calendar date.
///
/// Built by a single grouped query during the closing batch; replaces the
/// untyped per-register lookup objects the legacy system accumulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DayTotals {
    /// Register these totals belong to.
    pub register_id: String,

    /// Number of movements on the date.
    pub movement_count: i64,

    /// Sum of income-direction amounts in centavos.
    pub income_cents: i64,

    /// Sum of expense-direction amounts in centavos.
    pub expense_cents: i64,
}

impl DayTotals {
    /// Empty totals for a register with no movements on the date.
    pub fn empty(register_id: impl Into<String>) -> Self {
        DayTotals {
            register_id: register_id.into(),
            movement_count: 0,
            income_cents: 0,
            expense_cents: 0,
        }
    }

    /// True if any movement happened on the date.
    #[inline]
    pub fn has_movements(&self) -> bool {
        self.movement_count > 0
    }

    /// Net signed delta (income - expense) as `Money`.
    #[inline]
    pub fn net(&self) -> Money {
        Money::from_cents(self.income_cents - self.expense_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
