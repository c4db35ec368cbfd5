//! # Seed Data Generator
//!
//! Populates a development database with a register, a couple of users, and
//! a plausible day of cash movements.
//!
//! ## Usage
//! ```bash
//! # Default: ./quetzal.db, 50 movements
//! cargo run -p quetzal-db --bin seed
//!
//! # Custom amount
//! cargo run -p quetzal-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p quetzal-db --bin seed -- --db ./data/quetzal.db
//! ```

use std::env;

use quetzal_core::{Money, MovementDirection};
use quetzal_db::{Database, DbConfig};

/// Concepts cycled through for seeded movements.
const INCOME_CONCEPTS: &[&str] = &[
    "Venta mostrador",
    "Venta receta",
    "Abono cliente",
    "Deposito inicial",
];

const EXPENSE_CONCEPTS: &[&str] = &[
    "Retiro para deposito",
    "Pago proveedor",
    "Compra insumos",
    "Devolucion cliente",
];

/// Small deterministic generator so seeded data is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn in_range(&mut self, low: u64, high: u64) -> u64 {
        low + self.next() % (high - low + 1)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = "./quetzal.db".to_string();
    let mut count: usize = 50;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" if i + 1 < args.len() => {
                db_path = args[i + 1].clone();
                i += 2;
            }
            "--count" if i + 1 < args.len() => {
                count = args[i + 1].parse()?;
                i += 2;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("Usage: seed [--db PATH] [--count N]");
                std::process::exit(1);
            }
        }
    }

    println!("Seeding {count} movements into {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let register = db.registers().create("Caja Principal").await?;
    let cashier = db.users().create("cajero1", "Cajero Uno").await?;
    db.users().create("admin", "Administrador").await?;

    let mut rng = Lcg(0x5eed);

    let mut income_total = Money::zero();
    let mut expense_total = Money::zero();

    for n in 0..count {
        // Roughly 3 incomes per expense, like a real drawer.
        let is_income = rng.in_range(0, 3) != 0;
        let amount_cents = rng.in_range(5_00, 350_00) as i64;

        let (direction, concept) = if is_income {
            income_total += Money::from_cents(amount_cents);
            (
                MovementDirection::Income,
                INCOME_CONCEPTS[n % INCOME_CONCEPTS.len()],
            )
        } else {
            expense_total += Money::from_cents(amount_cents);
            (
                MovementDirection::Expense,
                EXPENSE_CONCEPTS[n % EXPENSE_CONCEPTS.len()],
            )
        };

        db.movements()
            .record(&register.id, direction, amount_cents, concept, &cashier.id, None)
            .await?;
    }

    let register = db.registers().get_by_id(&register.id).await?.unwrap();

    println!("Done.");
    println!("  Register:  {} ({})", register.name, register.id);
    println!("  Income:    {income_total}");
    println!("  Expense:   {expense_total}");
    println!("  Balance:   {}", register.balance());

    db.close().await;
    Ok(())
}
