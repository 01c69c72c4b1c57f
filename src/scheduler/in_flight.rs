//! # Single-delivery ticket.
//!
//! [`InFlight`] is a guard over a shared flag: acquiring it fails while another
//! ticket is alive, dropping it frees the slot. A delivery keeps its ticket
//! until the last listener returns, even across an execution context.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Proof that the holder owns the subscription's only delivery slot.
pub struct InFlight {
    flag: Arc<AtomicBool>,
}

impl InFlight {
    /// Acquires the slot guarded by `flag`, or `None` if it is taken.
    pub(crate) fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl fmt::Debug for InFlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InFlight")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_ticket_waits_for_first_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        let first = InFlight::try_acquire(&flag).unwrap();
        assert!(InFlight::try_acquire(&flag).is_none());
        drop(first);
        assert!(InFlight::try_acquire(&flag).is_some());
    }
}
