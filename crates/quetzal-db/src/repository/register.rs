//! # Register Repository
//!
//! Database operations for cash registers.
//!
//! Registers are long-lived rows: they are created once, occasionally
//! deactivated, and their balance is mutated only through the movement
//! write path and the daily-closing balance push - never directly here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use quetzal_core::Register;

/// Repository for register database operations.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// Creates a new active register with a zero balance.
    pub async fn create(&self, name: &str) -> DbResult<Register> {
        let register = Register {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            balance_cents: 0,
            active: true,
            created_at: Utc::now(),
        };

        debug!(id = %register.id, name = %register.name, "Creating register");

        sqlx::query(
            r#"
            INSERT INTO registers (id, name, balance_cents, active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&register.id)
        .bind(&register.name)
        .bind(register.balance_cents)
        .bind(register.active)
        .bind(register.created_at)
        .execute(&self.pool)
        .await?;

        Ok(register)
    }

    /// Gets a register by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Register>> {
        let register = sqlx::query_as::<_, Register>(
            r#"
            SELECT id, name, balance_cents, active, created_at
            FROM registers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    /// Lists all active registers, oldest first.
    ///
    /// This is the set the closing scheduler iterates.
    pub async fn list_active(&self) -> DbResult<Vec<Register>> {
        let registers = sqlx::query_as::<_, Register>(
            r#"
            SELECT id, name, balance_cents, active, created_at
            FROM registers
            WHERE active = 1
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(registers)
    }

    /// Activates or deactivates a register.
    ///
    /// Deactivated registers keep their history but are skipped by the
    /// closing scheduler.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE registers SET active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Register", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let created = db.registers().create("Caja Principal").await.unwrap();
        assert_eq!(created.balance_cents, 0);
        assert!(created.active);

        let fetched = db
            .registers()
            .get_by_id(&created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.name, "Caja Principal");
        assert_eq!(fetched.balance_cents, 0);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.registers().get_by_id("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_active_skips_deactivated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let a = db.registers().create("Caja 1").await.unwrap();
        let b = db.registers().create("Caja 2").await.unwrap();
        db.registers().set_active(&b.id, false).await.unwrap();

        let active = db.registers().list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, a.id);
    }
}
