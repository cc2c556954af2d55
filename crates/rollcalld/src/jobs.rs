//! Periodic background jobs
//!
//! Two single-instance jobs drive the session lifecycle: the per-minute
//! clock and the daily materializer. Each owns a non-reentrant guard so a
//! new tick is skipped, not queued, while the previous one for the same
//! job is still in flight.

use chrono::{DateTime, Local};
use rollcall_core::{MaterializeOutcome, SessionClock, SessionMaterializer, TickOutcome};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// The per-minute session clock job
pub struct ClockJob {
    clock: Arc<SessionClock>,
    guard: Mutex<()>,
}

impl ClockJob {
    pub fn new(clock: Arc<SessionClock>) -> Self {
        Self {
            clock,
            guard: Mutex::new(()),
        }
    }

    /// Run one tick against the real clock. Returns None when a previous
    /// tick is still running and this one was skipped.
    pub fn tick_now(&self) -> Option<TickOutcome> {
        let _lock = self.guard.try_lock().ok()?;
        let now = rollcall_util::now();
        let outcome = self.clock.tick(now.date_naive(), now.time());
        if outcome != TickOutcome::default() {
            debug!(
                activated = outcome.activated,
                completed = outcome.completed,
                failed = outcome.failed,
                "Clock tick"
            );
        }
        Some(outcome)
    }

    /// Spawn the periodic loop
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(interval_secs = interval.as_secs(), "Session clock running");

            loop {
                ticker.tick().await;
                if self.tick_now().is_none() {
                    warn!("Previous clock tick still running, skipping");
                }
            }
        })
    }
}

/// The daily materializer job
pub struct MaterializerJob {
    materializer: SessionMaterializer,
    guard: Mutex<()>,
}

impl MaterializerJob {
    pub fn new(materializer: SessionMaterializer) -> Self {
        Self {
            materializer,
            guard: Mutex::new(()),
        }
    }

    /// Materialize today's sessions. Returns None when a previous run is
    /// still in flight.
    pub fn run_now(&self) -> Option<MaterializeOutcome> {
        let _lock = self.guard.try_lock().ok()?;
        let now = rollcall_util::now();
        Some(self.materializer.run(now.date_naive(), now))
    }

    /// Spawn the daily loop: one catch-up run immediately (covers a
    /// daemon restarted mid-day), then once per day at `hour` local time.
    pub fn spawn(self: Arc<Self>, hour: u8) -> JoinHandle<()> {
        tokio::spawn(async move {
            if self.run_now().is_none() {
                warn!("Materializer already running at startup");
            }

            loop {
                let wait = duration_until_hour(rollcall_util::now(), hour);
                info!(
                    next_run_in_secs = wait.as_secs(),
                    "Materializer sleeping until next daily run"
                );
                tokio::time::sleep(wait).await;

                if self.run_now().is_none() {
                    warn!("Previous materializer run still in flight, skipping");
                }
            }
        })
    }
}

/// Time until the next occurrence of `hour`:00:00 local, strictly in the
/// future.
fn duration_until_hour(now: DateTime<Local>, hour: u8) -> Duration {
    let naive_now = now.naive_local();
    let today_target = now
        .date_naive()
        .and_hms_opt(u32::from(hour), 0, 0)
        .expect("hour validated to 0..=23");

    let target = if today_target > naive_now {
        today_target
    } else {
        today_target + chrono::Duration::days(1)
    };

    (target - naive_now)
        .to_std()
        .unwrap_or(Duration::from_secs(60))
}
