use crate::error::SubmitError;

use super::{Executor, Job};

/// Runs every job on the thread that submits it.
///
/// Listeners then execute on the scheduler's tick task, so they must be short.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        job();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "inline"
    }
}
