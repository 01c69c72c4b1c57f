//! # Single-queue execution context.
//!
//! ```text
//! submit(job) ──try_send──► [bounded queue] ──► worker task ──► job()
//!                  │                                 └────────► panic → warn!, continue
//!                  └─ full / closed → job dropped, warn!
//! ```
//!
//! ## Rules
//! - **FIFO**: jobs run one at a time in submission order
//! - **Non-blocking**: `submit()` returns immediately (uses `try_send`)
//! - **Isolation**: a panicking job is logged; the worker keeps draining
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state
//! inconsistent if a job panics while holding a lock.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Mutex;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::SubmitError;
use crate::sync::{lock, panic_message};

use super::{Executor, Job};

/// Serial queue drained by one tokio worker task.
///
/// Behaves like a UI-style event queue: jobs from any number of
/// subscriptions share one strictly ordered lane.
pub struct SerialExecutor {
    name: &'static str,
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SerialExecutor {
    /// Default queue capacity.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Spawns the worker on `runtime` with a queue of `capacity` jobs (min 1).
    #[must_use]
    pub fn new(name: &'static str, capacity: usize, runtime: &Handle) -> Self {
        let (tx, mut rx) = mpsc::channel::<Job>(capacity.max(1));

        let worker = runtime.spawn(async move {
            while let Some(job) = rx.recv().await {
                if let Err(panic_err) = catch_unwind(AssertUnwindSafe(job)) {
                    tracing::warn!(
                        executor = name,
                        panic = %panic_message(&*panic_err),
                        "job panicked"
                    );
                }
            }
        });

        Self {
            name,
            sender: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Stops accepting jobs and waits until the queued ones have run.
    pub async fn shutdown(&self) {
        drop(lock(&self.sender).take());
        let worker = lock(&self.worker).take();
        if let Some(worker) = worker {
            let _ = worker.await;
        }
    }
}

impl Executor for SerialExecutor {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        let sender = lock(&self.sender).clone();
        let Some(sender) = sender else {
            tracing::warn!(executor = self.name, reason = "closed", "job dropped");
            return Err(SubmitError::Closed);
        };
        sender.try_send(job).map_err(|err| {
            let err = match err {
                mpsc::error::TrySendError::Full(_) => SubmitError::Full,
                mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
            };
            tracing::warn!(executor = self.name, reason = err.as_label(), "job dropped");
            err
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn runs_jobs_in_submission_order_past_panics() {
        let exec = SerialExecutor::new("ui", 16, &Handle::current());
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let seen = Arc::clone(&seen);
            exec.submit(Box::new(move || {
                if i == 2 {
                    panic!("job {i}");
                }
                seen.lock().unwrap().push(i);
            }))
            .unwrap();
        }
        exec.shutdown().await;
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 3, 4]);
    }

    #[tokio::test]
    async fn closed_queue_drops_work() {
        let exec = SerialExecutor::new("ui", 1, &Handle::current());
        exec.shutdown().await;

        let ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&ran);
        let result = exec.submit(Box::new(move || *flag.lock().unwrap() = true));
        assert_eq!(result, Err(SubmitError::Closed));
        assert!(!*ran.lock().unwrap());
    }
}
