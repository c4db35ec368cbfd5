//! # Ledger Service
//!
//! Front door for cash movement recording and period queries.
//!
//! ## Recording Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Movement Recording Flow                            │
//! │                                                                         │
//! │  record_movement(register, direction, amount, concept, user)            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  1. Validate: amount > 0, concept non-empty and <= 50 chars             │
//! │        │         (rejected input never reaches the database)            │
//! │        ▼                                                                │
//! │  2. MovementRepository::record - one transaction:                       │
//! │        read balance -> insert movement with snapshot -> push balance    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  3. Return the persisted movement (id, occurred_at, balance_after)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service never holds state of its own; every call goes straight to
//! the repositories so concurrent callers serialize on the database.

use chrono::NaiveDate;
use tracing::debug;

use quetzal_core::validation::{validate_amount_cents, validate_concept};
use quetzal_core::{CoreError, Money, Movement, MovementDirection};
use quetzal_db::Database;

use crate::error::LedgerResult;

// =============================================================================
// Ledger Service
// =============================================================================

/// Records cash movements and answers period queries for one store's
/// registers.
#[derive(Clone)]
pub struct LedgerService {
    /// Database connection.
    db: Database,
}

impl LedgerService {
    /// Creates a new ledger service over the given database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Records a cash movement against a register.
    ///
    /// The amount must be strictly positive; direction alone decides whether
    /// it adds to or subtracts from the balance. The concept is trimmed
    /// before storage.
    ///
    /// `reference_id` links a correcting movement to the one it reverses.
    /// Reversals are ordinary opposite-direction movements, never deletions.
    ///
    /// ## Errors
    /// * [`CoreError::InvalidAmount`] - amount is zero or negative
    /// * [`CoreError::Validation`] - concept empty or over 50 characters
    /// * [`CoreError::RegisterNotFound`] - no such register
    /// * [`LedgerError::ConcurrencyConflict`] - lost a write race; retryable
    ///
    /// [`LedgerError::ConcurrencyConflict`]: crate::error::LedgerError::ConcurrencyConflict
    pub async fn record_movement(
        &self,
        register_id: &str,
        direction: MovementDirection,
        amount: Money,
        concept: &str,
        user_id: &str,
        reference_id: Option<&str>,
    ) -> LedgerResult<Movement> {
        if validate_amount_cents(amount.cents()).is_err() {
            return Err(CoreError::InvalidAmount {
                amount_cents: amount.cents(),
            }
            .into());
        }
        validate_concept(concept).map_err(CoreError::from)?;

        let movement = self
            .db
            .movements()
            .record(
                register_id,
                direction,
                amount.cents(),
                concept.trim(),
                user_id,
                reference_id,
            )
            .await?;

        debug!(
            register_id = %register_id,
            direction = %direction,
            amount = %amount,
            balance_after = %movement.balance_after(),
            "Movement recorded"
        );

        Ok(movement)
    }

    /// Convenience wrapper: records money entering the drawer.
    pub async fn record_income(
        &self,
        register_id: &str,
        amount: Money,
        concept: &str,
        user_id: &str,
    ) -> LedgerResult<Movement> {
        self.record_movement(
            register_id,
            MovementDirection::Income,
            amount,
            concept,
            user_id,
            None,
        )
        .await
    }

    /// Convenience wrapper: records money leaving the drawer.
    pub async fn record_expense(
        &self,
        register_id: &str,
        amount: Money,
        concept: &str,
        user_id: &str,
    ) -> LedgerResult<Movement> {
        self.record_movement(
            register_id,
            MovementDirection::Expense,
            amount,
            concept,
            user_id,
            None,
        )
        .await
    }

    /// All movements for a register between two dates, both full days
    /// inclusive, ordered by occurrence.
    ///
    /// An unknown register is an error rather than an empty result, so
    /// callers can tell "no activity" apart from "no such drawer".
    pub async fn movements_in_range(
        &self,
        register_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<Vec<Movement>> {
        self.require_register(register_id).await?;

        let movements = self
            .db
            .movements()
            .in_range(register_id, start_date, end_date)
            .await?;

        Ok(movements)
    }

    /// Current running balance of a register.
    pub async fn current_balance(&self, register_id: &str) -> LedgerResult<Money> {
        let register = self
            .db
            .registers()
            .get_by_id(register_id)
            .await?
            .ok_or_else(|| CoreError::RegisterNotFound(register_id.to_string()))?;

        Ok(register.balance())
    }

    async fn require_register(&self, register_id: &str) -> LedgerResult<()> {
        self.db
            .registers()
            .get_by_id(register_id)
            .await?
            .ok_or_else(|| CoreError::RegisterNotFound(register_id.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use quetzal_db::DbConfig;

    async fn setup() -> (Database, LedgerService, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let register = db.registers().create("Caja Principal").await.unwrap();
        let user = db.users().create("cajero1", "Cajero Uno").await.unwrap();
        let service = LedgerService::new(db.clone());
        (db, service, register.id, user.id)
    }

    #[tokio::test]
    async fn income_then_expense_runs_the_balance() {
        let (_db, service, register, user) = setup().await;

        let a = service
            .record_income(&register, Money::from_cents(10_000), "Venta mostrador", &user)
            .await
            .unwrap();
        let b = service
            .record_expense(&register, Money::from_cents(3_000), "Pago proveedor", &user)
            .await
            .unwrap();

        assert_eq!(a.balance_after(), Money::from_cents(10_000));
        assert_eq!(b.balance_after(), Money::from_cents(7_000));
        assert_eq!(
            service.current_balance(&register).await.unwrap(),
            Money::from_cents(7_000)
        );
    }

    #[tokio::test]
    async fn zero_and_negative_amounts_are_rejected_without_writes() {
        let (_db, service, register, user) = setup().await;
        let today = chrono::Utc::now().date_naive();

        for cents in [0, -500] {
            let err = service
                .record_income(&register, Money::from_cents(cents), "Ajuste", &user)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                LedgerError::Core(CoreError::InvalidAmount { amount_cents }) if amount_cents == cents
            ));
        }

        let movements = service
            .movements_in_range(&register, today, today)
            .await
            .unwrap();
        assert!(movements.is_empty());
        assert_eq!(
            service.current_balance(&register).await.unwrap(),
            Money::zero()
        );
    }

    #[tokio::test]
    async fn concept_must_be_present_and_fit() {
        let (_db, service, register, user) = setup().await;

        let err = service
            .record_income(&register, Money::from_cents(100), "   ", &user)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));

        let too_long = "x".repeat(51);
        let err = service
            .record_income(&register, Money::from_cents(100), &too_long, &user)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));

        let at_limit = "x".repeat(50);
        service
            .record_income(&register, Money::from_cents(100), &at_limit, &user)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_register_is_a_domain_error() {
        let (_db, service, _register, user) = setup().await;
        let today = chrono::Utc::now().date_naive();

        let err = service
            .record_income("no-such-register", Money::from_cents(100), "Venta", &user)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::RegisterNotFound(_))
        ));

        let err = service
            .movements_in_range("no-such-register", today, today)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::RegisterNotFound(_))
        ));
    }

    #[tokio::test]
    async fn reversal_links_back_to_the_original() {
        let (_db, service, register, user) = setup().await;

        let original = service
            .record_income(&register, Money::from_cents(2_500), "Venta mostrador", &user)
            .await
            .unwrap();

        let reversal = service
            .record_movement(
                &register,
                MovementDirection::Expense,
                Money::from_cents(2_500),
                "Reverso venta",
                &user,
                Some(&original.id),
            )
            .await
            .unwrap();

        assert_eq!(reversal.reference_id.as_deref(), Some(original.id.as_str()));
        assert_eq!(
            service.current_balance(&register).await.unwrap(),
            Money::zero()
        );
    }
}
