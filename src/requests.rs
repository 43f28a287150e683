use std::collections::HashMap;

/// Independent request streams within one screen. Only the most recently
/// dispatched request of a slot may update the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Page,
    Enrichment,
    Verify,
    FileContent,
    Analysis,
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

/// Hands out monotonically increasing request ids and remembers the latest
/// one per slot.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next: u64,
    latest: HashMap<Slot, RequestId>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, slot: Slot) -> RequestId {
        self.next += 1;
        let id = RequestId(self.next);
        self.latest.insert(slot, id);
        id
    }

    /// True if `id` is the newest request dispatched for `slot`.
    pub fn is_current(&self, slot: Slot, id: RequestId) -> bool {
        self.latest.get(&slot) == Some(&id)
    }

    /// Accept a completion and retire its id, so a duplicate delivery is
    /// rejected too.
    pub fn complete(&mut self, slot: Slot, id: RequestId) -> bool {
        if self.is_current(slot, id) {
            self.latest.remove(&slot);
            true
        } else {
            false
        }
    }

    /// Forget the in-flight request of `slot`; its reply will be rejected.
    pub fn cancel(&mut self, slot: Slot) {
        self.latest.remove(&slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_request_is_current() {
        let mut tracker = RequestTracker::new();
        let first = tracker.dispatch(Slot::FileContent);
        let second = tracker.dispatch(Slot::FileContent);

        assert!(!tracker.is_current(Slot::FileContent, first));
        assert!(tracker.is_current(Slot::FileContent, second));
        assert!(!tracker.complete(Slot::FileContent, first));
        assert!(tracker.complete(Slot::FileContent, second));
        assert!(!tracker.is_current(Slot::FileContent, second));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut tracker = RequestTracker::new();
        let content = tracker.dispatch(Slot::FileContent);
        let analysis = tracker.dispatch(Slot::Analysis);

        assert!(tracker.is_current(Slot::FileContent, content));
        assert!(tracker.is_current(Slot::Analysis, analysis));
        assert!(!tracker.is_current(Slot::Analysis, content));
    }

    #[test]
    fn test_duplicate_completion_is_rejected() {
        let mut tracker = RequestTracker::new();
        let id = tracker.dispatch(Slot::Commit);
        assert!(tracker.complete(Slot::Commit, id));
        assert!(!tracker.complete(Slot::Commit, id));
    }

    #[test]
    fn test_cancelled_request_is_rejected() {
        let mut tracker = RequestTracker::new();
        let id = tracker.dispatch(Slot::Verify);
        tracker.cancel(Slot::Verify);
        assert!(!tracker.complete(Slot::Verify, id));
    }

    #[test]
    fn test_ids_increase_across_slots() {
        let mut tracker = RequestTracker::new();
        let page = tracker.dispatch(Slot::Page);
        let enrich = tracker.dispatch(Slot::Enrichment);
        let reload = tracker.dispatch(Slot::Page);
        assert!(page < enrich && enrich < reload);
    }
}
