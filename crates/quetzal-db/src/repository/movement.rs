//! # Movement Repository
//!
//! Database operations for the register movement log.
//!
//! ## The Atomic Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       record() - one transaction                        │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. SELECT balance_cents FROM registers WHERE id = ?                 │
//! │    2. new_balance = ledger::apply(balance, direction, amount)          │
//! │    3. INSERT INTO movements (..., balance_after_cents = new_balance)   │
//! │    4. UPDATE registers SET balance_cents = new_balance                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Both rows land or neither does. SQLite's single-writer lock makes     │
//! │  the read-modify-write linearizable per database, which covers the     │
//! │  per-register requirement; a competing writer waits on the busy        │
//! │  timeout and then surfaces as ConcurrencyConflict for retry.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Append-Only
//! There is deliberately no update or delete method here. Corrections are
//! new offsetting movements (an annulled sale posts an Expense referencing
//! the original sale id).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use quetzal_core::ledger;
use quetzal_core::{DayTotals, Money, Movement, MovementDirection};

/// Computes the UTC half-open interval covering `start_date..=end_date` as
/// full calendar days: `[start 00:00:00, end+1day 00:00:00)`.
fn day_range_bounds(start_date: NaiveDate, end_date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_date.and_time(NaiveTime::MIN).and_utc();
    let end = (end_date + chrono::Days::new(1))
        .and_time(NaiveTime::MIN)
        .and_utc();
    (start, end)
}

/// Repository for movement database operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Records a movement and updates the register balance atomically.
    ///
    /// ## Arguments
    /// * `register_id` - Owning register (must exist)
    /// * `direction` - Income or expense
    /// * `amount_cents` - Positive amount; the caller validates sign
    /// * `concept` - Free-text description
    /// * `user_id` - Acting user (must exist; enforced by foreign key)
    /// * `reference_id` - Optional link to the originating business record
    ///
    /// ## Returns
    /// The persisted movement including its balance snapshot.
    ///
    /// ## Errors
    /// * `NotFound` - register does not exist
    /// * `ForeignKeyViolation` - user does not exist
    /// * `ConcurrencyConflict` - lost the write lock; retry the operation
    pub async fn record(
        &self,
        register_id: &str,
        direction: MovementDirection,
        amount_cents: i64,
        concept: &str,
        user_id: &str,
        reference_id: Option<&str>,
    ) -> DbResult<Movement> {
        let mut tx = self.pool.begin().await?;

        // Read the balance inside the transaction so the snapshot cannot
        // interleave with a competing movement on the same register.
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance_cents FROM registers WHERE id = ?1")
                .bind(register_id)
                .fetch_optional(&mut *tx)
                .await?;

        let balance = match balance {
            Some(cents) => Money::from_cents(cents),
            None => return Err(DbError::not_found("Register", register_id)),
        };

        let new_balance = ledger::apply(balance, direction, Money::from_cents(amount_cents));

        let movement = Movement {
            id: Uuid::new_v4().to_string(),
            register_id: register_id.to_string(),
            direction,
            amount_cents,
            occurred_at: Utc::now(),
            concept: concept.trim().to_string(),
            reference_id: reference_id.map(str::to_string),
            user_id: user_id.to_string(),
            balance_after_cents: new_balance.cents(),
        };

        sqlx::query(
            r#"
            INSERT INTO movements (
                id, register_id, direction, amount_cents,
                occurred_at, concept, reference_id, user_id,
                balance_after_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.register_id)
        .bind(movement.direction)
        .bind(movement.amount_cents)
        .bind(movement.occurred_at)
        .bind(&movement.concept)
        .bind(&movement.reference_id)
        .bind(&movement.user_id)
        .bind(movement.balance_after_cents)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE registers SET balance_cents = ?2 WHERE id = ?1")
            .bind(register_id)
            .bind(new_balance.cents())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            register_id = %register_id,
            direction = %direction,
            amount = %Money::from_cents(amount_cents),
            previous_balance = %balance,
            new_balance = %new_balance,
            "Movement recorded"
        );

        Ok(movement)
    }

    /// Lists movements for a register within a calendar-date range,
    /// ascending by timestamp.
    ///
    /// Both ends are inclusive full days: `start_date 00:00:00` through the
    /// last instant of `end_date`. Read-only - this drives both reports and
    /// the closing computation.
    pub async fn in_range(
        &self,
        register_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> DbResult<Vec<Movement>> {
        let (start, end) = day_range_bounds(start_date, end_date);

        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, register_id, direction, amount_cents,
                   occurred_at, concept, reference_id, user_id,
                   balance_after_cents
            FROM movements
            WHERE register_id = ?1
              AND occurred_at >= ?2
              AND occurred_at < ?3
            ORDER BY occurred_at, id
            "#,
        )
        .bind(register_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Net signed sum (income - expense) of all movements for a register
    /// recorded at or after `from`.
    ///
    /// Used to derive a bootstrap opening balance: the balance at `from` is
    /// the live balance minus everything that has happened since.
    pub async fn net_since(&self, register_id: &str, from: DateTime<Utc>) -> DbResult<i64> {
        let net: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN direction = 'income' THEN amount_cents ELSE -amount_cents END
            ), 0)
            FROM movements
            WHERE register_id = ?1 AND occurred_at >= ?2
            "#,
        )
        .bind(register_id)
        .bind(from)
        .fetch_one(&self.pool)
        .await?;

        Ok(net)
    }

    /// Per-register movement totals for one calendar date, across all
    /// registers that moved that day, in a single grouped query.
    ///
    /// Registers with no movements on the date are simply absent from the
    /// result; callers treat absence as `DayTotals::empty`.
    pub async fn day_totals(&self, date: NaiveDate) -> DbResult<Vec<DayTotals>> {
        let (start, end) = day_range_bounds(date, date);

        let totals = sqlx::query_as::<_, DayTotals>(
            r#"
            SELECT register_id,
                   COUNT(*) AS movement_count,
                   COALESCE(SUM(CASE WHEN direction = 'income'  THEN amount_cents ELSE 0 END), 0) AS income_cents,
                   COALESCE(SUM(CASE WHEN direction = 'expense' THEN amount_cents ELSE 0 END), 0) AS expense_cents
            FROM movements
            WHERE occurred_at >= ?1 AND occurred_at < ?2
            GROUP BY register_id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    /// Movement totals for one register on one calendar date.
    ///
    /// Returns empty totals (count 0) when the register did not move.
    pub async fn day_totals_for(
        &self,
        register_id: &str,
        date: NaiveDate,
    ) -> DbResult<DayTotals> {
        let (start, end) = day_range_bounds(date, date);

        let totals = sqlx::query_as::<_, DayTotals>(
            r#"
            SELECT register_id,
                   COUNT(*) AS movement_count,
                   COALESCE(SUM(CASE WHEN direction = 'income'  THEN amount_cents ELSE 0 END), 0) AS income_cents,
                   COALESCE(SUM(CASE WHEN direction = 'expense' THEN amount_cents ELSE 0 END), 0) AS expense_cents
            FROM movements
            WHERE register_id = ?1
              AND occurred_at >= ?2 AND occurred_at < ?3
            GROUP BY register_id
            "#,
        )
        .bind(register_id)
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await?;

        Ok(totals.unwrap_or_else(|| DayTotals::empty(register_id)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use quetzal_core::MovementDirection::{Expense, Income};

    async fn setup() -> (Database, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let register = db.registers().create("Caja Principal").await.unwrap();
        let user = db.users().create("cajero1", "Cajero Uno").await.unwrap();
        (db, register.id, user.id)
    }

    #[tokio::test]
    async fn test_record_updates_balance_and_snapshot() {
        let (db, register_id, user_id) = setup().await;
        let movements = db.movements();

        let a = movements
            .record(&register_id, Income, 10000, "Venta #1", &user_id, None)
            .await
            .unwrap();
        assert_eq!(a.balance_after_cents, 10000);

        let b = movements
            .record(&register_id, Expense, 3000, "Retiro", &user_id, None)
            .await
            .unwrap();
        assert_eq!(b.balance_after_cents, 7000);

        let register = db
            .registers()
            .get_by_id(&register_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(register.balance_cents, 7000);
    }

    #[tokio::test]
    async fn test_record_unknown_register_fails_without_write() {
        let (db, _register_id, user_id) = setup().await;

        let err = db
            .movements()
            .record("no-such-register", Income, 500, "Venta", &user_id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_record_unknown_user_rolls_back_balance() {
        let (db, register_id, _user_id) = setup().await;

        let err = db
            .movements()
            .record(&register_id, Income, 500, "Venta", "no-such-user", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        // The balance update in the same transaction must not survive.
        let register = db
            .registers()
            .get_by_id(&register_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(register.balance_cents, 0);
    }

    #[tokio::test]
    async fn test_balance_may_go_negative() {
        let (db, register_id, user_id) = setup().await;

        let m = db
            .movements()
            .record(&register_id, Expense, 2500, "Retiro", &user_id, None)
            .await
            .unwrap();
        assert_eq!(m.balance_after_cents, -2500);
    }

    #[tokio::test]
    async fn test_in_range_orders_chronologically() {
        let (db, register_id, user_id) = setup().await;
        let movements = db.movements();

        movements
            .record(&register_id, Income, 100, "m1", &user_id, None)
            .await
            .unwrap();
        movements
            .record(&register_id, Income, 200, "m2", &user_id, None)
            .await
            .unwrap();
        movements
            .record(&register_id, Expense, 50, "m3", &user_id, None)
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let listed = movements.in_range(&register_id, today, today).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|w| w[0].occurred_at <= w[1].occurred_at));

        // The snapshot chain replays exactly.
        let end = ledger::verify_snapshots(Money::zero(), &listed).unwrap();
        assert_eq!(end.cents(), 250);
    }

    #[tokio::test]
    async fn test_in_range_excludes_other_days() {
        let (db, register_id, user_id) = setup().await;

        db.movements()
            .record(&register_id, Income, 100, "hoy", &user_id, None)
            .await
            .unwrap();

        let yesterday = Utc::now().date_naive() - chrono::Days::new(1);
        let listed = db
            .movements()
            .in_range(&register_id, yesterday, yesterday)
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_day_totals_grouped_by_register() {
        let (db, register_a, user_id) = setup().await;
        let register_b = db.registers().create("Caja 2").await.unwrap().id;
        let movements = db.movements();

        movements
            .record(&register_a, Income, 10000, "Venta", &user_id, None)
            .await
            .unwrap();
        movements
            .record(&register_a, Expense, 3000, "Retiro", &user_id, None)
            .await
            .unwrap();
        movements
            .record(&register_b, Income, 500, "Venta", &user_id, None)
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let mut totals = movements.day_totals(today).await.unwrap();
        totals.sort_by(|a, b| a.register_id.cmp(&b.register_id));
        assert_eq!(totals.len(), 2);

        let for_a = totals.iter().find(|t| t.register_id == register_a).unwrap();
        assert_eq!(for_a.movement_count, 2);
        assert_eq!(for_a.income_cents, 10000);
        assert_eq!(for_a.expense_cents, 3000);

        let for_b = movements.day_totals_for(&register_b, today).await.unwrap();
        assert_eq!(for_b.income_cents, 500);
        assert_eq!(for_b.expense_cents, 0);

        // A register that did not move gets empty totals.
        let quiet = db.registers().create("Caja 3").await.unwrap();
        let for_quiet = movements.day_totals_for(&quiet.id, today).await.unwrap();
        assert!(!for_quiet.has_movements());
    }
}
