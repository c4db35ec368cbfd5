//! # Day Closer
//!
//! Computes and persists the daily closing record for one register and one
//! calendar date.
//!
//! ## Closing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Daily Closing Flow                                │
//! │                                                                         │
//! │  close_day(register, date, user)                                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  1. Already closed? -> return the stored record untouched               │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  2. Opening balance:                                                    │
//! │       previous date closed -> its closing balance                       │
//! │       otherwise            -> live balance minus everything recorded    │
//! │                               since the date started (bootstrap)        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  3. Totals: single grouped query over the date's movements              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  4. closing = opening + income - expense                                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  5. Persist closed record + push closing onto the register balance      │
//! │     (one transaction; a closed row is terminal)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A date with zero movements still gets a record: opening equals closing,
//! so the day-over-day chain never has holes.

use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{debug, info, warn};

use quetzal_core::{ledger, CoreError, DailyClosing, Money};
use quetzal_db::{ClosingRepository, Database};

use crate::error::{LedgerError, LedgerResult};

// =============================================================================
// Day Closer
// =============================================================================

/// Closes calendar days for cash registers.
#[derive(Clone)]
pub struct DayCloser {
    /// Database connection.
    db: Database,
}

/// Result of closing a batch of registers for one date.
///
/// One register failing never aborts the rest; its error is kept here and
/// the pass moves on.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Registers whose day is now closed (including already-closed ones).
    pub closed: Vec<String>,

    /// Registers that could not be closed, with the reason.
    pub failed: Vec<(String, LedgerError)>,
}

impl BatchOutcome {
    /// True when every register in the batch closed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl DayCloser {
    /// Creates a new day closer over the given database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Closes `date` for one register and returns the persisted record.
    ///
    /// Idempotent: if the date is already closed the stored record comes
    /// back unchanged. Closing a date with no movements writes a record
    /// whose opening and closing balances are equal.
    pub async fn close_day(
        &self,
        register_id: &str,
        date: NaiveDate,
        user_id: &str,
    ) -> LedgerResult<DailyClosing> {
        let closings = self.db.closings();

        if let Some(existing) = closings.get(register_id, date).await? {
            if existing.closed {
                debug!(register_id, %date, "Day already closed, keeping stored record");
                return Ok(existing);
            }
        }

        let opening = self.opening_balance(register_id, date).await?;
        let totals = self.db.movements().day_totals_for(register_id, date).await?;
        let closing_balance = ledger::closing_balance(opening, &totals);

        let mut row = ClosingRepository::new_row(
            register_id,
            date,
            opening.cents(),
            closing_balance.cents(),
            totals.income_cents,
            totals.expense_cents,
        );
        row.closed = true;
        row.closed_at = Some(Utc::now());
        row.closed_by = Some(user_id.to_string());

        closings.record_closed(&row).await?;

        info!(
            register_id,
            %date,
            opening = %opening,
            closing = %closing_balance,
            movements = totals.movement_count,
            "Day closed"
        );

        // A concurrent closer may have won the upsert; re-read so the caller
        // always sees the stored record.
        let stored = closings.get(register_id, date).await?.unwrap_or(row);
        Ok(stored)
    }

    /// Closes `date` for every register in the batch, isolating failures.
    pub async fn close_registers(
        &self,
        register_ids: &[String],
        date: NaiveDate,
        user_id: &str,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for register_id in register_ids {
            match self.close_day(register_id, date, user_id).await {
                Ok(_) => outcome.closed.push(register_id.clone()),
                Err(err) => {
                    warn!(
                        register_id = %register_id,
                        %date,
                        error = %err,
                        "Failed to close day, continuing with remaining registers"
                    );
                    outcome.failed.push((register_id.clone(), err));
                }
            }
        }

        outcome
    }

    /// Opening balance of a register for `date`.
    ///
    /// Chain rule: the previous date's closed record hands its closing
    /// balance forward. Without one (first-ever closing, or a hole in the
    /// chain) the opening is reconstructed from the live balance by backing
    /// out every movement recorded since the date began. In the common case,
    /// closing yesterday before today has activity, that reconstruction is
    /// exactly the live balance.
    pub async fn opening_balance(
        &self,
        register_id: &str,
        date: NaiveDate,
    ) -> LedgerResult<Money> {
        if let Some(previous) = date.pred_opt() {
            if let Some(row) = self.db.closings().get(register_id, previous).await? {
                if row.closed {
                    return Ok(row.closing());
                }
            }
        }

        let register = self
            .db
            .registers()
            .get_by_id(register_id)
            .await?
            .ok_or_else(|| CoreError::RegisterNotFound(register_id.to_string()))?;

        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let net_since = self
            .db
            .movements()
            .net_since(register_id, day_start)
            .await?;

        Ok(register.balance() - Money::from_cents(net_since))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::LedgerService;
    use quetzal_db::DbConfig;

    async fn setup() -> (Database, DayCloser, LedgerService, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let register = db.registers().create("Caja Principal").await.unwrap();
        let user = db.users().create("cajero1", "Cajero Uno").await.unwrap();
        let closer = DayCloser::new(db.clone());
        let service = LedgerService::new(db.clone());
        (db, closer, service, register.id, user.id)
    }

    #[tokio::test]
    async fn first_closing_reconstructs_opening_from_zero() {
        let (db, closer, service, register, user) = setup().await;
        let today = Utc::now().date_naive();

        service
            .record_income(&register, Money::from_cents(10_000), "Venta mostrador", &user)
            .await
            .unwrap();
        service
            .record_expense(&register, Money::from_cents(3_000), "Pago proveedor", &user)
            .await
            .unwrap();

        let record = closer.close_day(&register, today, &user).await.unwrap();

        assert_eq!(record.opening(), Money::zero());
        assert_eq!(record.income_cents, 10_000);
        assert_eq!(record.expense_cents, 3_000);
        assert_eq!(record.closing(), Money::from_cents(7_000));
        assert!(record.closed);
        assert_eq!(record.closed_by.as_deref(), Some(user.as_str()));
        assert!(record.is_balanced());

        // Closing pushed the balance back, which was its value already.
        let stored = db.registers().get_by_id(&register).await.unwrap().unwrap();
        assert_eq!(stored.balance(), Money::from_cents(7_000));
    }

    #[tokio::test]
    async fn closing_twice_returns_the_same_record() {
        let (_db, closer, service, register, user) = setup().await;
        let today = Utc::now().date_naive();

        service
            .record_income(&register, Money::from_cents(5_000), "Venta", &user)
            .await
            .unwrap();

        let first = closer.close_day(&register, today, &user).await.unwrap();
        let second = closer.close_day(&register, today, &user).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.closed_at, second.closed_at);
        assert_eq!(first.closing_cents, second.closing_cents);
    }

    #[tokio::test]
    async fn zero_movement_day_closes_flat() {
        let (_db, closer, service, register, user) = setup().await;
        let today = Utc::now().date_naive();

        service
            .record_income(&register, Money::from_cents(5_000), "Fondo inicial", &user)
            .await
            .unwrap();

        // Two days out: no record for the day before, no movements that day.
        let quiet_day = today.succ_opt().unwrap().succ_opt().unwrap();
        let record = closer.close_day(&register, quiet_day, &user).await.unwrap();

        assert_eq!(record.opening(), Money::from_cents(5_000));
        assert_eq!(record.closing(), Money::from_cents(5_000));
        assert_eq!(record.income_cents, 0);
        assert_eq!(record.expense_cents, 0);
        assert!(record.closed);
    }

    #[tokio::test]
    async fn next_day_opens_at_previous_closing() {
        let (_db, closer, service, register, user) = setup().await;
        let today = Utc::now().date_naive();
        let tomorrow = today.succ_opt().unwrap();

        service
            .record_income(&register, Money::from_cents(8_000), "Venta", &user)
            .await
            .unwrap();

        let first = closer.close_day(&register, today, &user).await.unwrap();
        let second = closer.close_day(&register, tomorrow, &user).await.unwrap();

        assert_eq!(second.opening_cents, first.closing_cents);
        assert_eq!(second.closing_cents, first.closing_cents);
    }

    #[tokio::test]
    async fn unknown_register_cannot_close() {
        let (_db, closer, _service, _register, user) = setup().await;
        let today = Utc::now().date_naive();

        let err = closer
            .close_day("no-such-register", today, &user)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::RegisterNotFound(_))
        ));
    }

    #[tokio::test]
    async fn one_bad_register_does_not_block_the_batch() {
        let (db, closer, service, register, user) = setup().await;
        let today = Utc::now().date_naive();

        let second = db.registers().create("Caja Dos").await.unwrap();
        service
            .record_income(&register, Money::from_cents(1_000), "Venta", &user)
            .await
            .unwrap();
        service
            .record_income(&second.id, Money::from_cents(2_000), "Venta", &user)
            .await
            .unwrap();

        let batch = vec![
            register.clone(),
            "no-such-register".to_string(),
            second.id.clone(),
        ];
        let outcome = closer.close_registers(&batch, today, &user).await;

        assert_eq!(outcome.closed, vec![register.clone(), second.id.clone()]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, "no-such-register");
        assert!(!outcome.is_complete());

        assert!(db.closings().is_closed(&register, today).await.unwrap());
        assert!(db.closings().is_closed(&second.id, today).await.unwrap());
    }
}
