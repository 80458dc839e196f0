//! Session ticker - drives the countdown once per period
//!
//! One tokio task, one `AppState::tick` per period. The task owns no lounge
//! data; it only holds a clone of the state handle, so stopping it never
//! leaves anything half-applied.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::AppState;

/// Handle to the running countdown task.
///
/// Dropping the handle cancels the task; [`SessionTicker::stop`] also waits
/// for it to finish.
#[derive(Debug)]
pub struct SessionTicker {
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SessionTicker {
    /// Spawn the ticker. Must be called inside a tokio runtime.
    ///
    /// The first tick happens one full period after start.
    pub fn start(state: AppState) -> Self {
        let period = Duration::from_millis(state.config().tick_interval_ms.max(1));
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        let handle = tokio::spawn(async move {
            let result = AssertUnwindSafe(run(state, period, token)).catch_unwind().await;
            if let Err(panic_info) = result {
                let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                tracing::error!(panic = %panic_msg, "Session ticker panicked, countdown stopped");
            }
        });

        tracing::info!(period_ms = period.as_millis() as u64, "Session ticker started");
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the ticker and wait for the task to exit
    pub async fn stop(mut self) {
        self.shutdown.cancel();
        let Some(handle) = self.handle.take() else {
            return;
        };
        match handle.await {
            Ok(()) => tracing::info!("Session ticker stopped"),
            Err(e) if e.is_cancelled() => tracing::debug!("Session ticker task cancelled"),
            Err(e) => tracing::error!(error = ?e, "Session ticker task failed"),
        }
    }
}

impl Drop for SessionTicker {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run(state: AppState, period: Duration, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    // Late ticks shift the schedule instead of bursting to catch up
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!("Session ticker received shutdown signal");
                break;
            }
            _ = interval.tick() => {
                state.tick();
            }
        }
    }
}
