//! Notification scheduling: when accumulated collector state becomes a delivery.
//!
//! Two interchangeable policies share the [`NotificationScheduler`] contract:
//!
//! | Policy                 | Tick does                                                  | Used for                          |
//! |------------------------|------------------------------------------------------------|-----------------------------------|
//! | [`ReactiveScheduler`]  | deliver once if something was pushed since the last tick   | a single directly-read collector  |
//! | [`PullScheduler`]      | pull a fresh aggregate and deliver it while there is demand| expressions combining collectors  |
//!
//! ## Shared rules
//! - Ticks fire at most once per configured interval (never closer).
//! - **At most one delivery in flight**: a tick that finds the previous
//!   delivery still running is skipped, not queued. The [`InFlight`] ticket
//!   handed to the target is released when the delivery is dropped.
//! - Ticks never block on the execution context.
//!
//! ## Lifecycle
//! ```text
//! Created ──start()──► Running ◄──resume()── Paused
//!    │                    │ ──────pause()────►  │
//!    └──────close()───────┴───────close()───────┴──► Closed (terminal)
//! ```
//! `start()` / `resume()` after `close()` fail with
//! [`LifecycleError::Closed`](crate::LifecycleError::Closed).

mod in_flight;
mod pull;
mod reactive;
mod ticker;

use std::time::Duration;

use crate::error::LifecycleError;

pub use in_flight::InFlight;
pub use pull::PullScheduler;
pub use reactive::ReactiveScheduler;

/// Lifecycle state of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Built, not started.
    Created,
    /// Ticking.
    Running,
    /// Suspended; accumulated state is kept.
    Paused,
    /// Terminal.
    Closed,
}

/// Which scheduling policy a scheduler implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingPolicy {
    /// Deliver only when something changed since the last tick.
    Reactive,
    /// Recompute the aggregate on every demanded tick.
    Pull,
}

/// Receiver of scheduler decisions (the director in production use).
pub trait DeliveryTarget: Send + Sync {
    /// Desired-rate callback: whether deliveries should continue.
    ///
    /// Ticks without demand do no work at all.
    fn has_demand(&self) -> bool;

    /// Turns accumulated state into one delivery.
    ///
    /// `ticket` must be held until the delivery has fully run.
    fn deliver(&self, ticket: InFlight);
}

/// Receiver of pull-policy deliveries.
pub trait PullTarget<R>: DeliveryTarget {
    /// Delivers a freshly pulled aggregate.
    fn deliver_pulled(&self, value: R, ticket: InFlight);
}

/// Contract shared by both scheduling policies.
pub trait NotificationScheduler: Send + Sync {
    /// Policy implemented by this scheduler.
    fn policy(&self) -> SchedulingPolicy;

    /// Minimum interval between two deliveries.
    fn max_rate(&self) -> Duration;

    /// Current lifecycle state.
    fn state(&self) -> SchedulerState;

    /// Schedules the first tick, one interval from now.
    fn start(&self) -> Result<(), LifecycleError>;

    /// Suspends ticking; accumulated dirty/backpressure state is kept.
    ///
    /// A no-op once closed.
    fn pause(&self) -> Result<(), LifecycleError>;

    /// Resumes ticking from the next tick boundary.
    fn resume(&self) -> Result<(), LifecycleError>;

    /// Cancels all pending ticks. Idempotent; returns `true` on the first call.
    fn close(&self) -> bool;

    /// Signals that a collector pushed new state.
    fn notify(&self);
}
