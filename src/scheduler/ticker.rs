//! # Tick loop shared by both scheduling policies.
//!
//! One tokio task per scheduler drives a fixed-interval clock:
//! ```text
//! loop {
//!   ├─► paused?    ─► wait for resume (cancellable), restart the clock
//!   ├─► interval.tick()  (MissedTickBehavior::Delay: never closer than `period`)
//!   └─► tick()           (policy function, never blocks on delivery)
//! }
//! exit: close() cancels the token; dropping the ticker does too
//! ```

use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::LifecycleError;
use crate::sync::lock;

use super::SchedulerState;

/// Lifecycle-guarded periodic clock.
pub(crate) struct Ticker {
    period: Duration,
    runtime: Handle,
    state: Mutex<SchedulerState>,
    gate: watch::Sender<bool>,
    token: CancellationToken,
}

impl Ticker {
    pub(crate) fn new(period: Duration, runtime: Handle) -> Self {
        let (gate, _rx) = watch::channel(true);
        Self {
            period,
            runtime,
            state: Mutex::new(SchedulerState::Created),
            gate,
            token: CancellationToken::new(),
        }
    }

    pub(crate) fn period(&self) -> Duration {
        self.period
    }

    pub(crate) fn state(&self) -> SchedulerState {
        *lock(&self.state)
    }

    /// Spawns the tick loop calling `tick` once per interval.
    pub(crate) fn start<F>(&self, tick: F) -> Result<(), LifecycleError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        {
            let mut state = lock(&self.state);
            match *state {
                SchedulerState::Created => *state = SchedulerState::Running,
                SchedulerState::Closed => return Err(LifecycleError::Closed { op: "start" }),
                SchedulerState::Running | SchedulerState::Paused => {
                    return Err(LifecycleError::AlreadyStarted);
                }
            }
        }

        let period = self.period;
        let token = self.token.clone();
        let gate = self.gate.subscribe();
        self.runtime.spawn(run_loop(period, token, gate, tick));
        tracing::debug!(?period, "scheduler started");
        Ok(())
    }

    pub(crate) fn pause(&self) -> Result<(), LifecycleError> {
        let mut state = lock(&self.state);
        match *state {
            SchedulerState::Running => {
                *state = SchedulerState::Paused;
                self.gate.send_replace(false);
                tracing::debug!("scheduler paused");
                Ok(())
            }
            SchedulerState::Paused | SchedulerState::Closed => Ok(()),
            SchedulerState::Created => Err(LifecycleError::NotStarted),
        }
    }

    pub(crate) fn resume(&self) -> Result<(), LifecycleError> {
        let mut state = lock(&self.state);
        match *state {
            SchedulerState::Paused => {
                *state = SchedulerState::Running;
                self.gate.send_replace(true);
                tracing::debug!("scheduler resumed");
                Ok(())
            }
            SchedulerState::Running => Ok(()),
            SchedulerState::Created => Err(LifecycleError::NotStarted),
            SchedulerState::Closed => Err(LifecycleError::Closed { op: "resume" }),
        }
    }

    pub(crate) fn close(&self) -> bool {
        let mut state = lock(&self.state);
        if *state == SchedulerState::Closed {
            return false;
        }
        *state = SchedulerState::Closed;
        self.token.cancel();
        tracing::debug!("scheduler closed");
        true
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_loop<F>(
    period: Duration,
    token: CancellationToken,
    mut gate: watch::Receiver<bool>,
    tick: F,
) where
    F: Fn() + Send + Sync + 'static,
{
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if !*gate.borrow_and_update() {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                changed = gate.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    interval.reset();
                    continue;
                }
            }
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                // The gate guard must be released before `tick` can pause or resume.
                let open = *gate.borrow();
                if open {
                    tick();
                }
            }
        }
    }
}
