//! # Execution contexts: where listener callbacks actually run.
//!
//! The director never calls listeners from the ticking task directly. Each
//! delivery is packaged as a [`Job`] and handed to an [`Executor`], whose
//! only obligation is to run it according to its own policy:
//!
//! | Executor           | Policy                                                 |
//! |--------------------|--------------------------------------------------------|
//! | [`InlineExecutor`] | runs the job immediately on the submitting thread      |
//! | [`SerialExecutor`] | one bounded FIFO queue drained by one worker task      |
//! | [`PoolExecutor`]   | tokio blocking pool, one job per blocking thread       |
//!
//! ## Rules
//! - `submit` never blocks.
//! - Work submitted for one subscription runs in submission order. Deliveries
//!   of a subscription never overlap (the scheduler keeps at most one in
//!   flight), so even the pool keeps per-subscription order.
//! - A job that cannot be accepted is dropped and `submit` returns a
//!   [`SubmitError`]. Dropping an unrun delivery job hands its events back to
//!   the subscription, which retries on a later tick.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use pvflow::{Executor, InlineExecutor};
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let h = Arc::clone(&hits);
//! InlineExecutor
//!     .submit(Box::new(move || {
//!         h.fetch_add(1, Ordering::SeqCst);
//!     }))
//!     .expect("inline executor never refuses work");
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

mod inline;
mod pool;
mod serial;

use crate::error::SubmitError;

pub use inline::InlineExecutor;
pub use pool::PoolExecutor;
pub use serial::SerialExecutor;

/// Unit of work submitted to an execution context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Minimal "submit work" capability.
pub trait Executor: Send + Sync + 'static {
    /// Accepts `job` and runs it according to the executor's policy.
    ///
    /// # Errors
    /// [`SubmitError`] if the job was refused (and dropped).
    fn submit(&self, job: Job) -> Result<(), SubmitError>;

    /// Returns the executor name (for logs).
    fn name(&self) -> &'static str {
        "executor"
    }
}
