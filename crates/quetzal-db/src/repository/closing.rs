//! # Daily Closing Repository
//!
//! Database operations for the end-of-day reconciliation rows.
//!
//! ## Closed Is Terminal
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              (register, date) state machine                             │
//! │                                                                         │
//! │   NoRecord ──save_open──► Open ──record_closed──► Closed (terminal)    │
//! │      │                     ▲ │                                          │
//! │      │                     └─┘ save_open may recompute an open row     │
//! │      └────────record_closed────────────────────────► Closed            │
//! │                                                                         │
//! │  The upsert in record_closed carries `WHERE closed = 0`, so even a     │
//! │  racing double-close cannot rewrite a closed row.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use quetzal_core::{DailyClosing, Register};

/// Repository for daily-closing database operations.
#[derive(Debug, Clone)]
pub struct ClosingRepository {
    pool: SqlitePool,
}

impl ClosingRepository {
    /// Creates a new ClosingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClosingRepository { pool }
    }

    /// Gets the closing row for a (register, date), if any.
    pub async fn get(&self, register_id: &str, date: NaiveDate) -> DbResult<Option<DailyClosing>> {
        let closing = sqlx::query_as::<_, DailyClosing>(
            r#"
            SELECT id, register_id, date, opening_cents, closing_cents,
                   income_cents, expense_cents, closed, closed_at, closed_by
            FROM daily_closings
            WHERE register_id = ?1 AND date = ?2
            "#,
        )
        .bind(register_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(closing)
    }

    /// Whether the (register, date) is closed.
    ///
    /// Absent row counts as not closed. This is the single cheap check the
    /// request-pipeline trigger performs before doing any aggregation work.
    pub async fn is_closed(&self, register_id: &str, date: NaiveDate) -> DbResult<bool> {
        let closed: Option<bool> = sqlx::query_scalar(
            "SELECT closed FROM daily_closings WHERE register_id = ?1 AND date = ?2",
        )
        .bind(register_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(closed.unwrap_or(false))
    }

    /// The most recent CLOSED row for a register, if any.
    ///
    /// Drives catch-up: the scheduler walks forward from this date.
    pub async fn latest_closed(&self, register_id: &str) -> DbResult<Option<DailyClosing>> {
        let closing = sqlx::query_as::<_, DailyClosing>(
            r#"
            SELECT id, register_id, date, opening_cents, closing_cents,
                   income_cents, expense_cents, closed, closed_at, closed_by
            FROM daily_closings
            WHERE register_id = ?1 AND closed = 1
            ORDER BY date DESC
            LIMIT 1
            "#,
        )
        .bind(register_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(closing)
    }

    /// Upserts an UNCLOSED placeholder row for a (register, date).
    ///
    /// Open rows may be recomputed freely; a closed row is left untouched
    /// by the guard.
    pub async fn save_open(&self, closing: &DailyClosing) -> DbResult<()> {
        debug!(
            register_id = %closing.register_id,
            date = %closing.date,
            "Saving open daily-closing placeholder"
        );

        sqlx::query(
            r#"
            INSERT INTO daily_closings (
                id, register_id, date, opening_cents, closing_cents,
                income_cents, expense_cents, closed, closed_at, closed_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, NULL, ?8)
            ON CONFLICT (register_id, date) DO UPDATE SET
                opening_cents = excluded.opening_cents,
                closing_cents = excluded.closing_cents,
                income_cents  = excluded.income_cents,
                expense_cents = excluded.expense_cents,
                closed_by     = excluded.closed_by
            WHERE daily_closings.closed = 0
            "#,
        )
        .bind(&closing.id)
        .bind(&closing.register_id)
        .bind(closing.date)
        .bind(closing.opening_cents)
        .bind(closing.closing_cents)
        .bind(closing.income_cents)
        .bind(closing.expense_cents)
        .bind(&closing.closed_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records a CLOSED reconciliation row and pushes its closing balance
    /// onto the register's live balance, in one transaction.
    ///
    /// Idempotent at the storage level: the `WHERE closed = 0` guard means
    /// an already-closed row is never rewritten, and a rejected upsert also
    /// skips the balance push, so losing a close race changes nothing.
    pub async fn record_closed(&self, closing: &DailyClosing) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let upsert = sqlx::query(
            r#"
            INSERT INTO daily_closings (
                id, register_id, date, opening_cents, closing_cents,
                income_cents, expense_cents, closed, closed_at, closed_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9)
            ON CONFLICT (register_id, date) DO UPDATE SET
                opening_cents = excluded.opening_cents,
                closing_cents = excluded.closing_cents,
                income_cents  = excluded.income_cents,
                expense_cents = excluded.expense_cents,
                closed        = 1,
                closed_at     = excluded.closed_at,
                closed_by     = excluded.closed_by
            WHERE daily_closings.closed = 0
            "#,
        )
        .bind(&closing.id)
        .bind(&closing.register_id)
        .bind(closing.date)
        .bind(closing.opening_cents)
        .bind(closing.closing_cents)
        .bind(closing.income_cents)
        .bind(closing.expense_cents)
        .bind(closing.closed_at)
        .bind(&closing.closed_by)
        .execute(&mut *tx)
        .await?;

        // Keep the live balance in agreement with the last closed day. Only
        // when this call actually closed the row: a rejected upsert must not
        // push a stale balance.
        if upsert.rows_affected() > 0 {
            sqlx::query("UPDATE registers SET balance_cents = ?2 WHERE id = ?1")
                .bind(&closing.register_id)
                .bind(closing.closing_cents)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(
            register_id = %closing.register_id,
            date = %closing.date,
            closing_cents = closing.closing_cents,
            "Daily closing recorded"
        );

        Ok(())
    }

    /// Active registers that do NOT have a closed row for `date`.
    ///
    /// This is the scheduler's day-gate: one query against persisted state,
    /// empty result means the whole pass short-circuits. Correct across
    /// restarts and across multiple instances because nothing is cached in
    /// process memory.
    pub async fn unclosed_active_registers(&self, date: NaiveDate) -> DbResult<Vec<Register>> {
        let registers = sqlx::query_as::<_, Register>(
            r#"
            SELECT r.id, r.name, r.balance_cents, r.active, r.created_at
            FROM registers r
            WHERE r.active = 1
              AND NOT EXISTS (
                  SELECT 1 FROM daily_closings c
                  WHERE c.register_id = r.id AND c.date = ?1 AND c.closed = 1
              )
            ORDER BY r.created_at
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(registers)
    }

    /// Builds a fresh closing row value (not yet persisted).
    pub fn new_row(
        register_id: &str,
        date: NaiveDate,
        opening_cents: i64,
        closing_cents: i64,
        income_cents: i64,
        expense_cents: i64,
    ) -> DailyClosing {
        DailyClosing {
            id: Uuid::new_v4().to_string(),
            register_id: register_id.to_string(),
            date,
            opening_cents,
            closing_cents,
            income_cents,
            expense_cents,
            closed: false,
            closed_at: None,
            closed_by: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    async fn setup() -> (Database, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let register = db.registers().create("Caja Principal").await.unwrap();
        let user = db.users().create("cajero1", "Cajero Uno").await.unwrap();
        (db, register.id, user.id)
    }

    fn closed_row(register_id: &str, date: NaiveDate, user_id: &str) -> DailyClosing {
        let mut row = ClosingRepository::new_row(register_id, date, 0, 7000, 10000, 3000);
        row.closed = true;
        row.closed_at = Some(Utc::now());
        row.closed_by = Some(user_id.to_string());
        row
    }

    #[tokio::test]
    async fn test_open_then_closed_lifecycle() {
        let (db, register_id, user_id) = setup().await;
        let closings = db.closings();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        assert!(!closings.is_closed(&register_id, date).await.unwrap());

        // Open placeholder, recomputed once.
        let mut open = ClosingRepository::new_row(&register_id, date, 0, 0, 0, 0);
        open.closed_by = Some(user_id.clone());
        closings.save_open(&open).await.unwrap();

        let mut recomputed = ClosingRepository::new_row(&register_id, date, 0, 500, 500, 0);
        recomputed.closed_by = Some(user_id.clone());
        closings.save_open(&recomputed).await.unwrap();

        let stored = closings.get(&register_id, date).await.unwrap().unwrap();
        assert!(!stored.closed);
        assert_eq!(stored.closing_cents, 500);

        // Close it.
        closings
            .record_closed(&closed_row(&register_id, date, &user_id))
            .await
            .unwrap();
        assert!(closings.is_closed(&register_id, date).await.unwrap());

        let stored = closings.get(&register_id, date).await.unwrap().unwrap();
        assert!(stored.is_balanced());
        assert_eq!(stored.closing_cents, 7000);

        // Balance pushed onto the register.
        let register = db
            .registers()
            .get_by_id(&register_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(register.balance_cents, 7000);
    }

    #[tokio::test]
    async fn test_closed_row_is_never_rewritten() {
        let (db, register_id, user_id) = setup().await;
        let closings = db.closings();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        closings
            .record_closed(&closed_row(&register_id, date, &user_id))
            .await
            .unwrap();

        // A second close attempt with different figures must not take.
        let mut tampered = ClosingRepository::new_row(&register_id, date, 0, 99999, 99999, 0);
        tampered.closed = true;
        tampered.closed_at = Some(Utc::now());
        tampered.closed_by = Some(user_id.clone());
        closings.record_closed(&tampered).await.unwrap();

        let stored = closings.get(&register_id, date).await.unwrap().unwrap();
        assert_eq!(stored.closing_cents, 7000);

        // And the rejected attempt must not have pushed its balance either.
        let register = db
            .registers()
            .get_by_id(&register_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(register.balance_cents, 7000);

        // Neither may save_open re-open it.
        let reopen = ClosingRepository::new_row(&register_id, date, 0, 1, 1, 0);
        closings.save_open(&reopen).await.unwrap();
        let stored = closings.get(&register_id, date).await.unwrap().unwrap();
        assert!(stored.closed);
        assert_eq!(stored.closing_cents, 7000);
    }

    #[tokio::test]
    async fn test_latest_closed_and_day_gate() {
        let (db, register_id, user_id) = setup().await;
        let closings = db.closings();

        let day1 = NaiveDate::from_ymd_opt(2026, 3, 13).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        assert!(closings.latest_closed(&register_id).await.unwrap().is_none());

        closings
            .record_closed(&closed_row(&register_id, day1, &user_id))
            .await
            .unwrap();

        let latest = closings.latest_closed(&register_id).await.unwrap().unwrap();
        assert_eq!(latest.date, day1);

        // Day gate: register is unclosed for day2, closed for day1.
        let unclosed = closings.unclosed_active_registers(day2).await.unwrap();
        assert_eq!(unclosed.len(), 1);
        assert_eq!(unclosed[0].id, register_id);
        assert!(closings
            .unclosed_active_registers(day1)
            .await
            .unwrap()
            .is_empty());
    }
}
