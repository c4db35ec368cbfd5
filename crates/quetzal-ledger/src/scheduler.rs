//! # Closing Scheduler
//!
//! Background task that keeps every past day closed for every active
//! register. This is the single automatic entry point for closings; nothing
//! else in the system triggers them on its own.
//!
//! ## Scheduling Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Closing Scheduler Flow                              │
//! │                                                                         │
//! │  tokio task, ticks every tick_interval_secs (default 30 min)            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  1. Before run_after_hour UTC (default 02:00)? -> skip this tick        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  2. Day gate: any active register without a closed record for           │
//! │     yesterday? (single query against stored closings, so a restart      │
//! │     never forgets what already ran)                                     │
//! │        │                                                                │
//! │        ├── none -> done, wait for next tick                             │
//! │        ▼                                                                │
//! │  3. Resolve the acting user (first active). None -> warn and retry      │
//! │     on a later tick; nothing is closed under a made-up user.            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  4. Per pending register: walk from the day after its latest closed     │
//! │     record (bounded by catchup_days) through yesterday, closing each    │
//! │     date in order. One register failing never stops the rest.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every pass is idempotent, so a tick that fires while a manual closing is
//! in flight at worst re-reads already-closed days.

use chrono::{Days, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use quetzal_core::Register;
use quetzal_db::Database;

use crate::closing::DayCloser;
use crate::error::{LedgerError, LedgerResult};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the closing scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between scheduler ticks.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,

    /// Closings only run at or after this hour (UTC). Keeps the pass out of
    /// the trading day while the date being closed is still settling.
    #[serde(default = "default_run_after_hour")]
    pub run_after_hour: u32,

    /// How many days back a catch-up walk may reach. Bounds the first pass
    /// after a long outage.
    #[serde(default = "default_catchup_days")]
    pub catchup_days: u64,
}

fn default_tick_interval() -> u64 {
    1800
}

fn default_run_after_hour() -> u32 {
    2
}

fn default_catchup_days() -> u64 {
    62
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            run_after_hour: default_run_after_hour(),
            catchup_days: default_catchup_days(),
        }
    }
}

// =============================================================================
// Pass Summary
// =============================================================================

/// What one scheduler pass accomplished.
#[derive(Debug, Default, Clone)]
pub struct ClosingPassSummary {
    /// Registers that needed closing when the pass started.
    pub registers_pending: usize,

    /// Registers now fully closed through yesterday.
    pub registers_closed: usize,

    /// Individual calendar days closed across all registers.
    pub days_closed: usize,

    /// Registers that failed and will be retried next pass.
    pub registers_failed: usize,

    /// True when the pass skipped because no active user exists to attribute
    /// the closings to.
    pub skipped_no_user: bool,
}

// =============================================================================
// Closing Scheduler
// =============================================================================

/// Periodically closes pending past days for all active registers.
pub struct ClosingScheduler {
    /// Database connection.
    db: Database,

    /// Closer shared with the per-register walks.
    closer: DayCloser,

    /// Scheduler configuration.
    config: SchedulerConfig,
}

/// Handle for controlling a spawned scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    /// Shutdown sender.
    shutdown_tx: mpsc::Sender<()>,
}

impl SchedulerHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> LedgerResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| LedgerError::Channel("Shutdown channel closed".into()))
    }
}

impl ClosingScheduler {
    /// Creates a new scheduler over the given database.
    pub fn new(db: Database, config: SchedulerConfig) -> Self {
        let closer = DayCloser::new(db.clone());
        Self { db, closer, config }
    }

    /// Spawns the scheduler loop as a Tokio task and returns its handle.
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(self.run(shutdown_rx));

        SchedulerHandle { shutdown_tx }
    }

    /// Scheduler loop. Runs until shutdown is requested.
    pub async fn run(self, mut shutdown_rx: mpsc::Receiver<()>) {
        info!(
            tick_interval_secs = self.config.tick_interval_secs,
            run_after_hour = self.config.run_after_hour,
            "Closing scheduler starting"
        );

        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.tick_interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Close pending days on interval
                _ = interval.tick() => {
                    let now = Utc::now();
                    if now.hour() < self.config.run_after_hour {
                        debug!(hour = now.hour(), "Before closing hour, skipping tick");
                        continue;
                    }

                    if let Err(e) = self.ensure_closed_through_yesterday().await {
                        error!(?e, "Closing pass failed");
                    }
                }

                // Shutdown
                _ = shutdown_rx.recv() => {
                    info!("Closing scheduler shutting down");
                    break;
                }
            }
        }

        info!("Closing scheduler stopped");
    }

    /// Runs one closing pass: every active register ends up with a closed
    /// record for every date through yesterday.
    pub async fn ensure_closed_through_yesterday(&self) -> LedgerResult<ClosingPassSummary> {
        self.ensure_closed_through(Utc::now().date_naive()).await
    }

    /// Same as [`ensure_closed_through_yesterday`] with `today` injected,
    /// which is what the tests drive.
    ///
    /// [`ensure_closed_through_yesterday`]: Self::ensure_closed_through_yesterday
    pub async fn ensure_closed_through(&self, today: NaiveDate) -> LedgerResult<ClosingPassSummary> {
        let mut summary = ClosingPassSummary::default();

        let yesterday = match today.pred_opt() {
            Some(date) => date,
            None => return Ok(summary),
        };

        // Day gate against stored closings: already-closed registers drop
        // out here, so repeated ticks after a completed pass are one query.
        let pending = self.db.closings().unclosed_active_registers(yesterday).await?;
        if pending.is_empty() {
            debug!(%yesterday, "All active registers already closed");
            return Ok(summary);
        }
        summary.registers_pending = pending.len();

        let user = match self.db.users().first_active().await? {
            Some(user) => user,
            None => {
                warn!(
                    %yesterday,
                    registers = pending.len(),
                    "No active user to attribute closings to, retrying next pass"
                );
                summary.skipped_no_user = true;
                return Ok(summary);
            }
        };

        info!(
            %yesterday,
            registers = pending.len(),
            closed_by = %user.username,
            "Closing pass starting"
        );

        for register in &pending {
            match self.catch_up_register(register, yesterday, &user.id).await {
                Ok(days) => {
                    summary.registers_closed += 1;
                    summary.days_closed += days;
                }
                Err(err) => {
                    warn!(
                        register_id = %register.id,
                        error = %err,
                        "Register failed to close, will retry next pass"
                    );
                    summary.registers_failed += 1;
                }
            }
        }

        info!(
            %yesterday,
            registers_closed = summary.registers_closed,
            days_closed = summary.days_closed,
            registers_failed = summary.registers_failed,
            "Closing pass finished"
        );

        Ok(summary)
    }

    /// Closes every pending date for one register, oldest first, through
    /// `through`. Returns how many days were closed.
    async fn catch_up_register(
        &self,
        register: &Register,
        through: NaiveDate,
        user_id: &str,
    ) -> LedgerResult<usize> {
        let horizon = through
            .checked_sub_days(Days::new(self.config.catchup_days))
            .unwrap_or(through);

        let start = match self.db.closings().latest_closed(&register.id).await? {
            Some(last) => {
                let next = last.date.succ_opt().unwrap_or(through);
                next.max(horizon)
            }
            // Nothing ever closed: only yesterday, the opening balance
            // reconstruction covers the history before it.
            None => through,
        };

        let mut days = 0;
        let mut date = start;
        while date <= through {
            self.closer.close_day(&register.id, date, user_id).await?;
            days += 1;
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        Ok(days)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
