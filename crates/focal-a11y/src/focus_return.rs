//! Focus Return
//!
//! Captures the focused element when a region becomes active and hands
//! focus back to it one frame after the region goes away.

use focal_dom::NodeId;

use crate::focus::restore_if_connected;
use crate::host::FocusProvider;
use crate::runtime::Deferred;
use crate::scheduler::Scheduler;

/// Snapshot holder tied to an active flag
#[derive(Debug, Default)]
pub struct FocusReturnGuard {
    active: bool,
    snapshot: Option<NodeId>,
}

impl FocusReturnGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn snapshot(&self) -> Option<NodeId> {
        self.snapshot
    }

    /// Follow the region's active flag
    ///
    /// Activating captures the current focus, replacing any earlier
    /// snapshot. Going from active to inactive queues the restore for the
    /// next frame.
    pub fn set_active<H: FocusProvider>(
        &mut self,
        active: bool,
        host: &H,
        scheduler: &mut Scheduler<Deferred>,
    ) {
        if active {
            self.snapshot = host.active_element();
            tracing::debug!("focus return captured {:?}", self.snapshot);
        } else if self.active {
            self.schedule_restore(scheduler);
        }
        self.active = active;
    }

    /// Region removed entirely; same as deactivating
    pub fn unmount(&mut self, scheduler: &mut Scheduler<Deferred>) {
        if self.active {
            self.schedule_restore(scheduler);
            self.active = false;
        }
    }

    /// Restore right now instead of on the next frame
    pub fn restore_focus<H: FocusProvider>(&mut self, host: &mut H) -> bool {
        match self.snapshot.take() {
            Some(target) => restore_if_connected(host, target),
            None => false,
        }
    }

    fn schedule_restore(&mut self, scheduler: &mut Scheduler<Deferred>) {
        if let Some(target) = self.snapshot.take() {
            scheduler.request_frame(Deferred::RestoreFocus { target });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focal_dom::Document;

    fn two_buttons() -> (Document, NodeId, NodeId) {
        let mut doc = Document::default();
        let body = doc.body();
        let a = doc.append_element(body, "button", &[]).unwrap();
        let b = doc.append_element(body, "button", &[]).unwrap();
        (doc, a, b)
    }

    #[test]
    fn test_deactivate_schedules_restore() {
        let (mut doc, a, b) = two_buttons();
        let mut sched = Scheduler::new();
        let mut guard = FocusReturnGuard::new();

        doc.focus(a);
        guard.set_active(true, &doc, &mut sched);
        doc.focus(b);
        guard.set_active(false, &doc, &mut sched);

        assert_eq!(doc.active_element(), Some(b));
        assert_eq!(sched.next_frame(), vec![Deferred::RestoreFocus { target: a }]);
        assert_eq!(guard.snapshot(), None);
    }

    #[test]
    fn test_reactivation_overwrites_snapshot() {
        let (mut doc, a, b) = two_buttons();
        let mut sched = Scheduler::new();
        let mut guard = FocusReturnGuard::new();

        doc.focus(a);
        guard.set_active(true, &doc, &mut sched);
        doc.focus(b);
        guard.set_active(true, &doc, &mut sched);
        assert_eq!(guard.snapshot(), Some(b));
    }

    #[test]
    fn test_inactive_to_inactive_is_noop() {
        let (doc, _, _) = two_buttons();
        let mut sched = Scheduler::new();
        let mut guard = FocusReturnGuard::new();

        guard.set_active(false, &doc, &mut sched);
        guard.unmount(&mut sched);
        assert!(!sched.has_pending_work());
    }

    #[test]
    fn test_unmount_while_active() {
        let (mut doc, a, _) = two_buttons();
        let mut sched = Scheduler::new();
        let mut guard = FocusReturnGuard::new();

        doc.focus(a);
        guard.set_active(true, &doc, &mut sched);
        guard.unmount(&mut sched);
        assert!(!guard.is_active());
        assert_eq!(sched.pending_frame(), 1);
    }

    #[test]
    fn test_synchronous_restore_once() {
        let (mut doc, a, b) = two_buttons();
        let mut sched = Scheduler::new();
        let mut guard = FocusReturnGuard::new();

        doc.focus(a);
        guard.set_active(true, &doc, &mut sched);
        doc.focus(b);
        assert!(guard.restore_focus(&mut doc));
        assert_eq!(doc.active_element(), Some(a));
        assert!(!guard.restore_focus(&mut doc));
    }
}
