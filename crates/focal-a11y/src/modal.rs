//! Modal Focus
//!
//! Dialog lifecycle on top of [`FocusManager`] and [`FocusReturnGuard`]:
//! store focus and show the container on open, move focus in and trap Tab
//! once the container is ready, close on Escape or an outside click, and
//! hand focus back on the next frame.

use serde::Deserialize;

use focal_dom::{KeyboardEvent, ListenerKind, NodeId, Subscription};

use crate::A11yError;
use crate::aria::DialogAria;
use crate::focus::{FocusManager, FocusOptions, InitialFocus};
use crate::focus_return::FocusReturnGuard;
use crate::host::{EventSource, RegionHost};
use crate::runtime::Deferred;
use crate::scheduler::Scheduler;
use crate::trap::{TrapOutcome, TrapRegistry};

/// Modal lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    /// Shown, waiting for `container_ready`
    Opening,
    Open,
    Closing,
}

/// Why a modal closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Escape,
    OutsideClick,
    /// Closed by the page (Cancel button, confirm, ...)
    Dismissed,
}

/// Result of routing a keydown through an open modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKeyOutcome {
    Ignored,
    Trap(TrapOutcome),
    Closed(CloseReason),
}

/// Modal options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModalOptions {
    /// Id of the element naming the dialog
    pub title_id: String,
    /// Id of the element describing the dialog
    pub description_id: Option<String>,
    pub initial_focus: Option<InitialFocus>,
    pub close_on_escape: bool,
    pub close_on_outside_click: bool,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            title_id: "modal-title".to_string(),
            description_id: None,
            initial_focus: None,
            close_on_escape: true,
            close_on_outside_click: true,
        }
    }
}

/// Focus controller for one dialog container
#[derive(Debug)]
pub struct ModalFocusController {
    options: ModalOptions,
    state: ModalState,
    container: NodeId,
    focus: FocusManager,
    guard: FocusReturnGuard,
    escape_listener: Option<Subscription>,
    click_listener: Option<Subscription>,
}

impl ModalFocusController {
    pub fn new(container: NodeId, options: ModalOptions) -> Self {
        // Restoration goes through the guard, not the manager
        let mut focus = FocusManager::new(FocusOptions {
            restore_focus: false,
            trap_focus: true,
            initial_focus: options.initial_focus.clone(),
        });
        focus.attach(container);

        Self {
            options,
            state: ModalState::Closed,
            container,
            focus,
            guard: FocusReturnGuard::new(),
            escape_listener: None,
            click_listener: None,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    /// Opening or open
    pub fn is_open(&self) -> bool {
        matches!(self.state, ModalState::Opening | ModalState::Open)
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn options(&self) -> &ModalOptions {
        &self.options
    }

    /// Whether this modal currently holds the Tab trap
    pub fn is_trapping(&self) -> bool {
        self.focus.is_trapping()
    }

    /// Element focus will return to
    pub fn return_target(&self) -> Option<NodeId> {
        self.guard.snapshot()
    }

    /// Show the dialog and remember who had focus
    pub fn open<H: RegionHost>(
        &mut self,
        host: &mut H,
        scheduler: &mut Scheduler<Deferred>,
    ) -> bool {
        if self.state != ModalState::Closed {
            tracing::debug!("modal {:?} already {:?}", self.container, self.state);
            return false;
        }

        self.focus.store_focus(host);
        self.guard.set_active(true, host, scheduler);
        if let Err(e) = self.show(host) {
            tracing::warn!("modal {:?} shown without dialog wiring: {}", self.container, e);
        }

        self.state = ModalState::Opening;
        tracing::info!("modal {:?} opening", self.container);
        true
    }

    fn show<H: RegionHost>(&self, host: &mut H) -> Result<(), A11yError> {
        if !host.is_connected(self.container) {
            return Err(A11yError::Detached(self.container));
        }
        host.remove_attribute(self.container, "hidden")?;
        DialogAria {
            labelled_by: self.options.title_id.clone(),
            described_by: self.options.description_id.clone(),
        }
        .apply(host, self.container)?;
        Ok(())
    }

    /// The container is rendered; move focus in and start trapping
    ///
    /// Focus goes to the configured target, else the first focusable
    /// element, else stays put. Returns the element that received focus.
    pub fn container_ready<H>(&mut self, host: &mut H, traps: &TrapRegistry) -> Option<NodeId>
    where
        H: RegionHost + EventSource,
    {
        if self.state != ModalState::Opening {
            return None;
        }
        if !host.is_connected(self.container) {
            tracing::debug!("modal container {:?} not in the document yet", self.container);
            return None;
        }

        let focused = if self.focus.set_initial_focus(host) {
            host.active_element()
        } else {
            self.focus
                .focusable_elements(host)
                .first()
                .copied()
                .filter(|&first| host.focus(first))
        };

        self.focus.enable_trap(traps, host);
        if self.options.close_on_escape {
            self.escape_listener = Some(host.listen(ListenerKind::KeyDown));
        }
        if self.options.close_on_outside_click {
            self.click_listener = Some(host.listen(ListenerKind::Click));
        }

        self.state = ModalState::Open;
        tracing::info!("modal {:?} open, focus on {:?}", self.container, focused);
        focused
    }

    /// Route a document keydown
    pub fn handle_key_down<H: RegionHost>(
        &mut self,
        host: &mut H,
        event: &mut KeyboardEvent,
        scheduler: &mut Scheduler<Deferred>,
    ) -> ModalKeyOutcome {
        if self.state != ModalState::Open {
            return ModalKeyOutcome::Ignored;
        }

        if event.key == "Escape" && self.escape_listener.is_some() {
            event.prevent_default();
            self.close(CloseReason::Escape, host, scheduler);
            return ModalKeyOutcome::Closed(CloseReason::Escape);
        }

        match self.focus.handle_key_down(host, event) {
            TrapOutcome::Ignored => ModalKeyOutcome::Ignored,
            outcome => ModalKeyOutcome::Trap(outcome),
        }
    }

    /// Route a document click on `target`
    pub fn handle_click<H: RegionHost>(
        &mut self,
        host: &mut H,
        target: NodeId,
        scheduler: &mut Scheduler<Deferred>,
    ) -> Option<CloseReason> {
        if self.state != ModalState::Open || self.click_listener.is_none() {
            return None;
        }
        if host.contains(self.container, target) {
            return None;
        }
        self.close(CloseReason::OutsideClick, host, scheduler);
        Some(CloseReason::OutsideClick)
    }

    /// Hide the dialog and queue the focus return
    pub fn close<H: RegionHost>(
        &mut self,
        reason: CloseReason,
        host: &mut H,
        scheduler: &mut Scheduler<Deferred>,
    ) -> bool {
        if self.state == ModalState::Closed {
            return false;
        }

        self.state = ModalState::Closing;
        self.release();
        if host.is_connected(self.container) {
            if let Err(e) = host.set_attribute(self.container, "hidden", "") {
                tracing::warn!("failed to hide modal {:?}: {}", self.container, e);
            }
        }
        self.focus.restore_previous_focus(scheduler);
        self.guard.set_active(false, host, scheduler);

        self.state = ModalState::Closed;
        tracing::info!("modal {:?} closed ({:?})", self.container, reason);
        true
    }

    /// The dialog is going away without a close
    pub fn unmount(&mut self, scheduler: &mut Scheduler<Deferred>) {
        if self.state == ModalState::Closed {
            return;
        }
        self.release();
        self.focus.restore_previous_focus(scheduler);
        self.guard.unmount(scheduler);
        self.state = ModalState::Closed;
        tracing::debug!("modal {:?} unmounted while open", self.container);
    }

    fn release(&mut self) {
        self.focus.disable_trap();
        self.escape_listener = None;
        self.click_listener = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focal_dom::Document;

    struct Page {
        doc: Document,
        sched: Scheduler<Deferred>,
        traps: TrapRegistry,
        trigger: NodeId,
        dialog: NodeId,
        confirm: NodeId,
        cancel: NodeId,
    }

    fn page() -> Page {
        let mut doc = Document::default();
        let body = doc.body();
        let trigger = doc.append_element(body, "button", &[("id", "open-modal")]).unwrap();
        let dialog = doc.append_element(body, "div", &[("id", "dialog"), ("hidden", "")]).unwrap();
        doc.append_element(dialog, "h2", &[("id", "modal-title")]).unwrap();
        let cancel = doc.append_element(dialog, "button", &[]).unwrap();
        let confirm = doc
            .append_element(dialog, "button", &[("id", "modal-primary-action")])
            .unwrap();
        doc.focus(trigger);

        Page {
            doc,
            sched: Scheduler::new(),
            traps: TrapRegistry::new(),
            trigger,
            dialog,
            confirm,
            cancel,
        }
    }

    fn open(p: &mut Page, options: ModalOptions) -> ModalFocusController {
        let mut modal = ModalFocusController::new(p.dialog, options);
        assert!(modal.open(&mut p.doc, &mut p.sched));
        modal.container_ready(&mut p.doc, &p.traps);
        modal
    }

    #[test]
    fn test_open_applies_dialog_wiring() {
        let mut p = page();
        let mut modal = ModalFocusController::new(p.dialog, ModalOptions::default());
        modal.open(&mut p.doc, &mut p.sched);

        assert_eq!(modal.state(), ModalState::Opening);
        assert!(!p.doc.has_attribute(p.dialog, "hidden"));
        assert_eq!(p.doc.get_attribute(p.dialog, "role"), Some("dialog"));
        assert_eq!(p.doc.get_attribute(p.dialog, "aria-modal"), Some("true"));
        assert_eq!(p.doc.get_attribute(p.dialog, "aria-labelledby"), Some("modal-title"));
        // Nothing moves until the container is ready
        assert_eq!(p.doc.active_element(), Some(p.trigger));
        assert!(!p.traps.is_active());
    }

    #[test]
    fn test_ready_focuses_initial_target() {
        let mut p = page();
        let options = ModalOptions {
            initial_focus: Some("button[id='modal-primary-action']".into()),
            ..Default::default()
        };
        let modal = open(&mut p, options);

        assert_eq!(modal.state(), ModalState::Open);
        assert_eq!(p.doc.active_element(), Some(p.confirm));
        assert!(modal.is_trapping());
    }

    #[test]
    fn test_ready_falls_back_to_first_focusable() {
        let mut p = page();
        let options = ModalOptions { initial_focus: Some("#missing".into()), ..Default::default() };
        open(&mut p, options);
        assert_eq!(p.doc.active_element(), Some(p.cancel));
    }

    #[test]
    fn test_escape_closes_and_restores_next_frame() {
        let mut p = page();
        let mut modal = open(&mut p, ModalOptions::default());

        let mut esc = KeyboardEvent::escape();
        let outcome = modal.handle_key_down(&mut p.doc, &mut esc, &mut p.sched);
        assert_eq!(outcome, ModalKeyOutcome::Closed(CloseReason::Escape));
        assert!(esc.is_default_prevented());
        assert_eq!(modal.state(), ModalState::Closed);
        assert!(p.doc.has_attribute(p.dialog, "hidden"));
        assert!(!p.traps.is_active());
        assert_eq!(p.doc.listener_count(ListenerKind::KeyDown), 0);
        assert_eq!(p.doc.listener_count(ListenerKind::Click), 0);

        assert_eq!(p.sched.next_frame(), vec![Deferred::RestoreFocus { target: p.trigger }]);
    }

    #[test]
    fn test_tab_delegated_to_trap() {
        let mut p = page();
        let mut modal = open(&mut p, ModalOptions::default());
        p.doc.focus(p.confirm);

        let mut tab = KeyboardEvent::tab();
        let outcome = modal.handle_key_down(&mut p.doc, &mut tab, &mut p.sched);
        assert_eq!(outcome, ModalKeyOutcome::Trap(TrapOutcome::Wrapped { to: p.cancel }));
        assert_eq!(p.doc.active_element(), Some(p.cancel));
    }

    #[test]
    fn test_outside_click_closes() {
        let mut p = page();
        let mut modal = open(&mut p, ModalOptions::default());

        assert_eq!(modal.handle_click(&mut p.doc, p.cancel, &mut p.sched), None);
        assert!(modal.is_open());
        assert_eq!(
            modal.handle_click(&mut p.doc, p.trigger, &mut p.sched),
            Some(CloseReason::OutsideClick)
        );
        assert!(!modal.is_open());
    }

    #[test]
    fn test_escape_disabled() {
        let mut p = page();
        let options = ModalOptions {
            close_on_escape: false,
            ..Default::default()
        };
        let mut modal = open(&mut p, options);

        let mut esc = KeyboardEvent::escape();
        let outcome = modal.handle_key_down(&mut p.doc, &mut esc, &mut p.sched);
        assert_eq!(outcome, ModalKeyOutcome::Ignored);
        assert!(modal.is_open());
    }

    #[test]
    fn test_close_twice_is_noop() {
        let mut p = page();
        let mut modal = open(&mut p, ModalOptions::default());

        assert!(modal.close(CloseReason::Dismissed, &mut p.doc, &mut p.sched));
        assert!(!modal.close(CloseReason::Dismissed, &mut p.doc, &mut p.sched));
        assert_eq!(p.sched.pending_frame(), 1);
    }

    #[test]
    fn test_unmount_releases_everything() {
        let mut p = page();
        let mut modal = open(&mut p, ModalOptions::default());
        assert_eq!(p.doc.listener_count(ListenerKind::KeyDown), 2);

        modal.unmount(&mut p.sched);
        assert!(!p.traps.is_active());
        assert_eq!(p.doc.listener_count(ListenerKind::KeyDown), 0);
        assert_eq!(p.sched.pending_frame(), 1);
    }

    #[test]
    fn test_drop_releases_listeners() {
        let mut p = page();
        let modal = open(&mut p, ModalOptions::default());
        drop(modal);
        assert!(!p.traps.is_active());
        assert_eq!(p.doc.listener_count(ListenerKind::KeyDown), 0);
    }
}
