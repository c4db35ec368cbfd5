//! # Ledger Math
//!
//! Pure balance arithmetic for the cash-register ledger. Everything here is
//! deterministic and I/O-free; the persistence layer calls these functions
//! and stores what they return.
//!
//! ## The Two Invariants
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. SNAPSHOT CHAIN                                                      │
//! │     For a register, ordering movements by timestamp and cumulatively   │
//! │     summing signed amounts reproduces each movement's stored           │
//! │     balance_after snapshot exactly. No drift, ever.                    │
//! │                                                                         │
//! │  2. CLOSING ARITHMETIC                                                  │
//! │     closing = opening + total income - total expense                    │
//! │     for every closed DailyClosing row.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::money::Money;
use crate::types::{DayTotals, Movement, MovementDirection};

/// Applies one movement to a balance and returns the new balance.
///
/// This is the single definition of "what a movement does to a drawer":
/// income adds, expense subtracts. No floor-at-zero check - negative
/// balances are recorded as-is and policed above the ledger.
///
/// ## Example
/// ```rust
/// use quetzal_core::ledger::apply;
/// use quetzal_core::{Money, MovementDirection};
///
/// let b = apply(Money::zero(), MovementDirection::Income, Money::from_cents(10000));
/// assert_eq!(b.cents(), 10000);
/// let b = apply(b, MovementDirection::Expense, Money::from_cents(3000));
/// assert_eq!(b.cents(), 7000);
/// ```
#[inline]
pub fn apply(balance: Money, direction: MovementDirection, amount: Money) -> Money {
    balance + direction.signed(amount)
}

/// Computes a closing balance from an opening balance and day totals.
#[inline]
pub fn closing_balance(opening: Money, totals: &DayTotals) -> Money {
    opening + totals.net()
}

/// Replays a movement sequence from a starting balance and returns the
/// final balance.
///
/// Movements must already be in timestamp order (the period query returns
/// them that way).
pub fn replay(start: Money, movements: &[Movement]) -> Money {
    movements
        .iter()
        .fold(start, |balance, m| balance + m.signed_amount())
}

/// A detected mismatch between a stored snapshot and the replayed balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDrift {
    /// Id of the first movement whose snapshot disagrees.
    pub movement_id: String,
    /// What the replay computed at that point.
    pub expected_cents: i64,
    /// What the movement row stores.
    pub stored_cents: i64,
}

/// Verifies the snapshot chain: replays from `start` and checks every
/// movement's stored `balance_after` against the running sum.
///
/// Returns the first drift found, or `Ok(final_balance)` when the chain is
/// intact. Used by reconciliation tooling and tests; the write path never
/// needs it because snapshots are computed and stored atomically.
pub fn verify_snapshots(start: Money, movements: &[Movement]) -> Result<Money, SnapshotDrift> {
    let mut balance = start;
    for m in movements {
        balance = balance + m.signed_amount();
        if balance.cents() != m.balance_after_cents {
            return Err(SnapshotDrift {
                movement_id: m.id.clone(),
                expected_cents: balance.cents(),
                stored_cents: m.balance_after_cents,
            });
        }
    }
    Ok(balance)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn movement(
        id: &str,
        direction: MovementDirection,
        amount_cents: i64,
        balance_after_cents: i64,
        minute: u32,
    ) -> Movement {
        Movement {
            id: id.to_string(),
            register_id: "r1".to_string(),
            direction,
            amount_cents,
            occurred_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, minute, 0).unwrap(),
            concept: "test".to_string(),
            reference_id: None,
            user_id: "u1".to_string(),
            balance_after_cents,
        }
    }

    /// Register starts at Q0.00. Income Q100.00 -> Q100.00, then Expense
    /// Q30.00 -> Q70.00, snapshots matching at each step.
    #[test]
    fn test_apply_income_then_expense() {
        let b0 = Money::zero();
        let b1 = apply(b0, MovementDirection::Income, Money::from_cents(10000));
        assert_eq!(b1.cents(), 10000);

        let b2 = apply(b1, MovementDirection::Expense, Money::from_cents(3000));
        assert_eq!(b2.cents(), 7000);
    }

    #[test]
    fn test_apply_allows_negative_balance() {
        let b = apply(
            Money::from_cents(1000),
            MovementDirection::Expense,
            Money::from_cents(2500),
        );
        assert_eq!(b.cents(), -1500);
    }

    #[test]
    fn test_replay_matches_signed_sum() {
        let movements = vec![
            movement("a", MovementDirection::Income, 10000, 10000, 0),
            movement("b", MovementDirection::Expense, 3000, 7000, 1),
            movement("c", MovementDirection::Income, 500, 7500, 2),
        ];
        assert_eq!(replay(Money::zero(), &movements).cents(), 7500);
    }

    #[test]
    fn test_verify_snapshots_intact() {
        let movements = vec![
            movement("a", MovementDirection::Income, 10000, 10000, 0),
            movement("b", MovementDirection::Expense, 3000, 7000, 1),
        ];
        let end = verify_snapshots(Money::zero(), &movements).unwrap();
        assert_eq!(end.cents(), 7000);
    }

    #[test]
    fn test_verify_snapshots_reports_first_drift() {
        let movements = vec![
            movement("a", MovementDirection::Income, 10000, 10000, 0),
            // Stored snapshot is off by one centavo.
            movement("b", MovementDirection::Expense, 3000, 6999, 1),
            movement("c", MovementDirection::Income, 500, 7499, 2),
        ];
        let drift = verify_snapshots(Money::zero(), &movements).unwrap_err();
        assert_eq!(drift.movement_id, "b");
        assert_eq!(drift.expected_cents, 7000);
        assert_eq!(drift.stored_cents, 6999);
    }

    #[test]
    fn test_closing_balance() {
        let totals = DayTotals {
            register_id: "r1".into(),
            movement_count: 2,
            income_cents: 10000,
            expense_cents: 3000,
        };
        assert_eq!(closing_balance(Money::zero(), &totals).cents(), 7000);

        // Zero movements: closing equals opening.
        let empty = DayTotals::empty("r1");
        assert_eq!(
            closing_balance(Money::from_cents(4200), &empty).cents(),
            4200
        );
    }
}
