//! Focus Trap Registry
//!
//! One document-level Tab interceptor, owned here and lent out to a single
//! container at a time. Acquiring for a new container releases the previous
//! holder first, and dropping a [`TrapLease`] detaches its listener, so a
//! modal that disappears without closing cannot leave a listener behind.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use focal_dom::{KeyboardEvent, ListenerKind, NodeId, Subscription};

use crate::focus::focusable_elements;
use crate::host::{EventSource, FocusProvider};

/// What the trap did with a keydown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapOutcome {
    /// Not a Tab, no active trap, detached container or nothing focusable
    Ignored,
    /// Tab inside the container, left to default traversal
    PassThrough,
    /// Focus wrapped around the container edge; default suppressed
    Wrapped { to: NodeId },
}

#[derive(Debug)]
struct ActiveTrap {
    lease_id: u64,
    container: NodeId,
    _listener: Subscription,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    active: Option<ActiveTrap>,
}

/// Owner of the single Tab interceptor
#[derive(Debug, Clone, Default)]
pub struct TrapRegistry {
    inner: Rc<RefCell<Registry>>,
}

impl TrapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trap Tab inside `container`, releasing any other holder
    pub fn acquire<S: EventSource>(&self, source: &mut S, container: NodeId) -> TrapLease {
        let mut registry = self.inner.borrow_mut();
        if let Some(previous) = registry.active.take() {
            tracing::warn!(
                "focus trap moved from {:?} to {:?}; previous holder released",
                previous.container,
                container
            );
        }

        registry.next_id += 1;
        let id = registry.next_id;
        registry.active = Some(ActiveTrap {
            lease_id: id,
            container,
            _listener: source.listen(ListenerKind::KeyDown),
        });
        tracing::debug!("focus trap {} acquired for {:?}", id, container);

        TrapLease {
            registry: Rc::downgrade(&self.inner),
            id,
            container,
        }
    }

    /// Container currently holding the trap
    pub fn active_container(&self) -> Option<NodeId> {
        self.inner.borrow().active.as_ref().map(|t| t.container)
    }

    pub fn is_active(&self) -> bool {
        self.inner.borrow().active.is_some()
    }

    /// Route a document keydown to whichever container holds the trap
    pub fn handle_key_down<H: FocusProvider>(
        &self,
        host: &mut H,
        event: &mut KeyboardEvent,
    ) -> TrapOutcome {
        match self.active_container() {
            Some(container) => wrap_tab(host, container, event),
            None => TrapOutcome::Ignored,
        }
    }
}

/// A container's hold on the trap; releases on drop
#[derive(Debug)]
pub struct TrapLease {
    registry: Weak<RefCell<Registry>>,
    id: u64,
    container: NodeId,
}

impl TrapLease {
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// False once another container acquired the trap
    pub fn is_active(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let active = registry.borrow().active.as_ref().is_some_and(|t| t.lease_id == self.id);
        active
    }

    /// Apply the Tab wrap for this lease's container
    pub fn handle_key_down<H: FocusProvider>(
        &self,
        host: &mut H,
        event: &mut KeyboardEvent,
    ) -> TrapOutcome {
        if !self.is_active() {
            return TrapOutcome::Ignored;
        }
        wrap_tab(host, self.container, event)
    }
}

impl Drop for TrapLease {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let Ok(mut registry) = registry.try_borrow_mut() else {
            return;
        };
        if registry.active.as_ref().is_some_and(|t| t.lease_id == self.id) {
            registry.active = None;
            tracing::debug!("focus trap {} released for {:?}", self.id, self.container);
        }
    }
}

/// Wrap Tab at the container edges
///
/// Tab on the last focusable element moves to the first, Shift+Tab on the
/// first moves to the last; both suppress the default. Every other Tab is
/// left alone.
pub fn wrap_tab<H: FocusProvider>(
    host: &mut H,
    container: NodeId,
    event: &mut KeyboardEvent,
) -> TrapOutcome {
    if !event.is_tab() {
        return TrapOutcome::Ignored;
    }
    if !host.is_connected(container) {
        tracing::debug!("trap container {:?} is detached; Tab ignored", container);
        return TrapOutcome::Ignored;
    }

    let focusable = focusable_elements(host, container);
    let (Some(&first), Some(&last)) = (focusable.first(), focusable.last()) else {
        return TrapOutcome::Ignored;
    };

    let active = host.active_element();
    let to = if event.shift_key {
        (active == Some(first)).then_some(last)
    } else {
        (active == Some(last)).then_some(first)
    };

    match to {
        Some(to) => {
            host.focus(to);
            event.prevent_default();
            TrapOutcome::Wrapped { to }
        }
        None => TrapOutcome::PassThrough,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focal_dom::Document;

    fn dialog_with_buttons(doc: &mut Document, n: usize) -> (NodeId, Vec<NodeId>) {
        let body = doc.body();
        let dialog = doc.append_element(body, "div", &[("role", "dialog")]).unwrap();
        let buttons = (0..n)
            .map(|_| doc.append_element(dialog, "button", &[]).unwrap())
            .collect();
        (dialog, buttons)
    }

    #[test]
    fn test_tab_wraps_forward() {
        let mut doc = Document::default();
        let (dialog, b) = dialog_with_buttons(&mut doc, 3);
        doc.focus(b[2]);

        let mut event = KeyboardEvent::tab();
        assert_eq!(wrap_tab(&mut doc, dialog, &mut event), TrapOutcome::Wrapped { to: b[0] });
        assert!(event.is_default_prevented());
        assert_eq!(doc.active_element(), Some(b[0]));
    }

    #[test]
    fn test_shift_tab_wraps_backward() {
        let mut doc = Document::default();
        let (dialog, b) = dialog_with_buttons(&mut doc, 3);
        doc.focus(b[0]);

        let mut event = KeyboardEvent::shift_tab();
        assert_eq!(wrap_tab(&mut doc, dialog, &mut event), TrapOutcome::Wrapped { to: b[2] });
        assert_eq!(doc.active_element(), Some(b[2]));
    }

    #[test]
    fn test_middle_tab_passes_through() {
        let mut doc = Document::default();
        let (dialog, b) = dialog_with_buttons(&mut doc, 3);
        doc.focus(b[1]);

        let mut event = KeyboardEvent::tab();
        assert_eq!(wrap_tab(&mut doc, dialog, &mut event), TrapOutcome::PassThrough);
        assert!(!event.is_default_prevented());
        assert_eq!(doc.active_element(), Some(b[1]));
    }

    #[test]
    fn test_empty_container_ignored() {
        let mut doc = Document::default();
        let (dialog, _) = dialog_with_buttons(&mut doc, 0);

        let mut event = KeyboardEvent::tab();
        assert_eq!(wrap_tab(&mut doc, dialog, &mut event), TrapOutcome::Ignored);
        assert!(!event.is_default_prevented());
    }

    #[test]
    fn test_single_interceptor() {
        let mut doc = Document::default();
        let (first, _) = dialog_with_buttons(&mut doc, 1);
        let (second, _) = dialog_with_buttons(&mut doc, 1);
        let traps = TrapRegistry::new();

        let lease_a = traps.acquire(&mut doc, first);
        assert_eq!(doc.listener_count(ListenerKind::KeyDown), 1);

        let lease_b = traps.acquire(&mut doc, second);
        assert_eq!(doc.listener_count(ListenerKind::KeyDown), 1);
        assert!(!lease_a.is_active());
        assert!(lease_b.is_active());
        assert_eq!(traps.active_container(), Some(second));

        // Stale lease must not release the new holder
        drop(lease_a);
        assert_eq!(traps.active_container(), Some(second));

        drop(lease_b);
        assert!(!traps.is_active());
        assert_eq!(doc.listener_count(ListenerKind::KeyDown), 0);
    }
}
