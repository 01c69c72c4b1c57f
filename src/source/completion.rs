use std::sync::Arc;

use crate::collectors::WriteCollector;
use crate::error::SourceError;

/// One-shot outcome slot of a single write.
///
/// Resolving it forwards the outcome to the write collector, which turns it
/// into `WriteSucceeded` / `WriteFailed`. Dropping it unresolved reports a
/// failure.
pub struct WriteCompletion {
    collector: Option<Arc<WriteCollector>>,
}

impl WriteCompletion {
    pub(crate) fn new(collector: Arc<WriteCollector>) -> Self {
        Self {
            collector: Some(collector),
        }
    }

    /// Reports that the write completed.
    pub fn succeeded(mut self) {
        if let Some(collector) = self.collector.take() {
            collector.write_succeeded();
        }
    }

    /// Reports that the write did not complete.
    pub fn failed(mut self, error: SourceError) {
        if let Some(collector) = self.collector.take() {
            collector.write_failed(error);
        }
    }
}

impl Drop for WriteCompletion {
    fn drop(&mut self) {
        if let Some(collector) = self.collector.take() {
            collector.write_failed(SourceError::write_rejected("write abandoned by source"));
        }
    }
}

impl std::fmt::Debug for WriteCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteCompletion")
            .field("resolved", &self.collector.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::collectors::Collector;
    use crate::events::Notification;

    fn recorded() -> (Arc<WriteCollector>, Arc<Mutex<Vec<Notification>>>) {
        let wc = Arc::new(WriteCollector::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        wc.set_notification_target(Some(Arc::new(move |n: Notification| {
            sink.lock().unwrap().push(n)
        })));
        (wc, seen)
    }

    #[test]
    fn resolves_exactly_once() {
        let (wc, seen) = recorded();
        WriteCompletion::new(Arc::clone(&wc)).succeeded();
        WriteCompletion::new(wc).failed(SourceError::Disconnected);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Notification::WriteSucceeded,
                Notification::WriteFailed(SourceError::Disconnected)
            ]
        );
    }

    #[test]
    fn dropping_unresolved_reports_failure() {
        let (wc, seen) = recorded();
        drop(WriteCompletion::new(wc));
        let seen = seen.lock().unwrap();
        assert!(matches!(
            seen.as_slice(),
            [Notification::WriteFailed(SourceError::WriteRejected { .. })]
        ));
    }
}
