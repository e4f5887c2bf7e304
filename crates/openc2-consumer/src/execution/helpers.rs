//! Cap on the helper threads that run timed handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts helper threads still running, including those whose caller has
/// stopped waiting for them.
#[derive(Debug, Clone)]
pub(crate) struct HelperLimit {
    active: Arc<AtomicUsize>,
    limit: usize,
}

impl HelperLimit {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            limit,
        }
    }

    /// Claims a slot, or returns `None` when every slot is taken.
    pub(crate) fn acquire(&self) -> Option<HelperSlot> {
        self.active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                (active < self.limit).then_some(active + 1)
            })
            .ok()
            .map(|_| HelperSlot {
                active: Arc::clone(&self.active),
            })
    }

    pub(crate) fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) const fn limit(&self) -> usize {
        self.limit
    }
}

/// A claimed slot; dropping it frees the slot.
#[derive(Debug)]
pub(crate) struct HelperSlot {
    active: Arc<AtomicUsize>,
}

impl Drop for HelperSlot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_refused_at_the_limit_and_freed_on_drop() {
        let limit = HelperLimit::new(2);
        let first = limit.acquire().expect("first slot");
        let second = limit.acquire().expect("second slot");
        assert!(limit.acquire().is_none());
        assert_eq!(limit.active(), 2);
        drop(first);
        let third = limit.acquire().expect("freed slot");
        drop((second, third));
        assert_eq!(limit.active(), 0);
    }
}
