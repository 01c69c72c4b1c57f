use std::panic::{AssertUnwindSafe, catch_unwind};

use tokio::runtime::Handle;

use crate::error::SubmitError;
use crate::sync::panic_message;

use super::{Executor, Job};

/// Runs jobs on the tokio blocking thread pool of a runtime.
#[derive(Debug, Clone)]
pub struct PoolExecutor {
    runtime: Handle,
}

impl PoolExecutor {
    /// Creates a pool executor over `runtime`'s blocking pool.
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Executor for PoolExecutor {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        self.runtime.spawn_blocking(move || {
            if let Err(panic_err) = catch_unwind(AssertUnwindSafe(job)) {
                tracing::warn!(
                    executor = "pool",
                    panic = %panic_message(&*panic_err),
                    "job panicked"
                );
            }
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "pool"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn runs_off_the_submitting_thread() {
        let exec = PoolExecutor::new(Handle::current());
        let (tx, rx) = mpsc::channel();
        let here = std::thread::current().id();
        exec.submit(Box::new(move || {
            let _ = tx.send(std::thread::current().id());
        }))
        .unwrap();
        let there = tokio::task::spawn_blocking(move || rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_ne!(here, there);
    }
}
