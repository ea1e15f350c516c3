//! Focus Management
//!
//! Snapshot/restore of the focused element, initial focus, the focusable
//! set of a container and sequential (Tab order) navigation.

use std::collections::HashMap;

use serde::Deserialize;

use focal_dom::{KeyboardEvent, NodeId};

use crate::A11yError;
use crate::host::{EventSource, FocusProvider, RegionHost};
use crate::runtime::Deferred;
use crate::scheduler::Scheduler;
use crate::trap::{TrapLease, TrapOutcome, TrapRegistry};

/// Elements reachable by Tab, before the visibility filter
pub const FOCUSABLE_SELECTOR: &str = concat!(
    "a[href], ",
    "button:not([disabled]), ",
    "input:not([disabled]), ",
    "textarea:not([disabled]), ",
    "select:not([disabled]), ",
    "[tabindex]:not([tabindex=\"-1\"]), ",
    "[contenteditable=\"true\"]"
);

/// Where focus goes when a region activates
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum InitialFocus {
    Selector(String),
    Element(NodeId),
}

impl From<String> for InitialFocus {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<&str> for InitialFocus {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<NodeId> for InitialFocus {
    fn from(id: NodeId) -> Self {
        Self::Element(id)
    }
}

impl InitialFocus {
    /// Resolve to a connected element
    pub fn resolve<H: FocusProvider>(&self, host: &H) -> Result<NodeId, A11yError> {
        match self {
            Self::Selector(selector) => host
                .query_selector(selector)?
                .ok_or_else(|| A11yError::TargetNotFound(selector.clone())),
            Self::Element(id) if host.is_connected(*id) => Ok(*id),
            Self::Element(id) => Err(A11yError::Detached(*id)),
        }
    }
}

/// Focus manager options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FocusOptions {
    /// Return focus to the stored element on restore
    pub restore_focus: bool,
    /// Install the Tab trap when enabled
    pub trap_focus: bool,
    pub initial_focus: Option<InitialFocus>,
}

impl Default for FocusOptions {
    fn default() -> Self {
        Self {
            restore_focus: true,
            trap_focus: false,
            initial_focus: None,
        }
    }
}

/// Focus state of one page region
#[derive(Debug, Default)]
pub struct FocusManager {
    options: FocusOptions,
    previous: Option<NodeId>,
    container: Option<NodeId>,
    trap: Option<TrapLease>,
}

impl FocusManager {
    pub fn new(options: FocusOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &FocusOptions {
        &self.options
    }

    /// Set the region this manager traps and searches
    pub fn attach(&mut self, container: NodeId) {
        self.container = Some(container);
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// Remember the focused element; overwrites any earlier snapshot
    pub fn store_focus<H: FocusProvider>(&mut self, host: &H) {
        self.previous = host.active_element();
        tracing::debug!("stored focus {:?}", self.previous);
    }

    /// Snapshot waiting to be restored
    pub fn stored_focus(&self) -> Option<NodeId> {
        self.previous
    }

    /// Consume the snapshot and schedule its restoration for the next frame
    ///
    /// The snapshot is dropped even when `restore_focus` is off. Returns
    /// whether a restore was scheduled.
    pub fn restore_previous_focus(&mut self, scheduler: &mut Scheduler<Deferred>) -> bool {
        let Some(target) = self.previous.take() else {
            return false;
        };
        if !self.options.restore_focus {
            tracing::debug!("focus restore disabled; dropping snapshot {:?}", target);
            return false;
        }
        scheduler.request_frame(Deferred::RestoreFocus { target });
        true
    }

    /// Focus the configured initial target, if it resolves
    pub fn set_initial_focus<H: FocusProvider>(&self, host: &mut H) -> bool {
        let Some(initial) = &self.options.initial_focus else {
            return false;
        };
        match initial.resolve(host) {
            Ok(id) => host.focus(id),
            Err(e) => {
                tracing::debug!("initial focus skipped: {}", e);
                false
            }
        }
    }

    /// Focusable elements of the attached container
    pub fn focusable_elements<H: FocusProvider>(&self, host: &H) -> Vec<NodeId> {
        match self.container {
            Some(container) => focusable_elements(host, container),
            None => Vec::new(),
        }
    }

    /// Acquire the Tab trap for the attached container
    ///
    /// No-op unless `trap_focus` is set and a container is attached.
    pub fn enable_trap<S: EventSource>(&mut self, traps: &TrapRegistry, source: &mut S) -> bool {
        if !self.options.trap_focus {
            return false;
        }
        let Some(container) = self.container else {
            tracing::debug!("trap requested without a container");
            return false;
        };
        self.trap = Some(traps.acquire(source, container));
        true
    }

    /// Release the Tab trap
    pub fn disable_trap(&mut self) {
        self.trap = None;
    }

    pub fn is_trapping(&self) -> bool {
        self.trap.as_ref().is_some_and(TrapLease::is_active)
    }

    /// Keydown handler for the trap
    pub fn handle_key_down<H: FocusProvider>(
        &self,
        host: &mut H,
        event: &mut KeyboardEvent,
    ) -> TrapOutcome {
        match &self.trap {
            Some(lease) => lease.handle_key_down(host, event),
            None => TrapOutcome::Ignored,
        }
    }
}

/// Focus `target` if it is still in the document
pub fn restore_if_connected<H: FocusProvider>(host: &mut H, target: NodeId) -> bool {
    if !host.is_connected(target) {
        tracing::debug!("restore target {:?} left the document; skipped", target);
        return false;
    }
    host.focus(target)
}

/// Tab-reachable elements inside `container`, in document order
///
/// Computed fresh on every call. An element counts if it has a box, or if
/// it is the focused element.
pub fn focusable_elements<H: FocusProvider>(host: &H, container: NodeId) -> Vec<NodeId> {
    let active = host.active_element();
    host.query_selector_all(container, FOCUSABLE_SELECTOR)
        .into_iter()
        .filter(|&id| {
            let (w, h) = host.offset_size(id);
            w > 0.0 || h > 0.0 || Some(id) == active
        })
        .collect()
}

/// Sequential navigation order for a subtree
///
/// Positive tabindex values come first in ascending order, then everything
/// else in document order.
pub fn tab_order<H: RegionHost>(host: &H, root: NodeId) -> Vec<NodeId> {
    let mut ordered: Vec<(i32, usize, NodeId)> = focusable_elements(host, root)
        .into_iter()
        .enumerate()
        .map(|(pos, id)| {
            let index = host
                .get_attribute(id, "tabindex")
                .map(|v| TabIndex::parse(&v))
                .unwrap_or(TabIndex::Sequential(0));
            let key = match index {
                TabIndex::Sequential(n) if n > 0 => n,
                _ => i32::MAX,
            };
            (key, pos, id)
        })
        .collect();
    ordered.sort();
    ordered.into_iter().map(|(_, _, id)| id).collect()
}

/// Default Tab / Shift+Tab traversal over the whole document
///
/// When the active element is not itself a tab stop (a `tabindex="-1"`
/// landmark, say), traversal continues from its position in the document.
/// Returns the newly focused element.
pub fn move_focus<H: RegionHost>(host: &mut H, forward: bool) -> Option<NodeId> {
    let order = tab_order(host, host.body());
    if order.is_empty() {
        return None;
    }

    let active = host.active_element();
    let current = active.and_then(|active| order.iter().position(|&id| id == active));
    let next = match (current, forward) {
        (Some(p), true) => order[(p + 1) % order.len()],
        (Some(0), false) => order[order.len() - 1],
        (Some(p), false) => order[p - 1],
        (None, _) => active
            .and_then(|active| stop_beside(host, &order, active, forward))
            .unwrap_or(if forward { order[0] } else { order[order.len() - 1] }),
    };

    host.focus(next).then_some(next)
}

/// First stop after `active` in document order (last before it, backwards)
fn stop_beside<H: RegionHost>(
    host: &H,
    order: &[NodeId],
    active: NodeId,
    forward: bool,
) -> Option<NodeId> {
    let positions: HashMap<NodeId, usize> = host
        .query_selector_all(host.body(), "*")
        .into_iter()
        .enumerate()
        .map(|(pos, id)| (id, pos))
        .collect();
    let at = *positions.get(&active)?;
    let position = |id: &&NodeId| positions.get(*id).copied();

    if forward {
        order.iter().find(|id| position(id).is_some_and(|p| p > at)).copied()
    } else {
        order.iter().rev().find(|id| position(id).is_some_and(|p| p < at)).copied()
    }
}

/// Tab index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIndex {
    NotFocusable,       // tabindex="-1" or unparseable
    Sequential(i32),    // tabindex="0" or positive
}

impl TabIndex {
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<i32>() {
            Ok(n) if n < 0 => Self::NotFocusable,
            Ok(n) => Self::Sequential(n),
            Err(_) => Self::NotFocusable,
        }
    }

    pub fn is_focusable(&self) -> bool {
        matches!(self, Self::Sequential(_))
    }
}

/// Focus indicator style
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FocusIndicator {
    pub color: String,
    pub width: f64,
    pub offset: f64,
    pub style: FocusStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusStyle {
    #[default]
    Outline,
    Ring,
    Underline,
}

impl Default for FocusIndicator {
    fn default() -> Self {
        Self {
            color: "#0066ff".to_string(),
            width: 2.0,
            offset: 2.0,
            style: FocusStyle::Ring,
        }
    }
}

impl FocusIndicator {
    /// CSS declarations for the indicator
    pub fn css(&self) -> String {
        match self.style {
            FocusStyle::Outline => format!(
                "outline: {}px solid {}; outline-offset: {}px;",
                self.width, self.color, self.offset
            ),
            FocusStyle::Ring => format!(
                "box-shadow: 0 0 0 {}px #ffffff, 0 0 0 {}px {};",
                self.offset,
                self.offset + self.width,
                self.color
            ),
            FocusStyle::Underline => format!(
                "text-decoration: underline {}px {}; text-underline-offset: {}px;",
                self.width, self.color, self.offset
            ),
        }
    }

    /// `:focus-within` for `container`
    pub fn focus_within<H: FocusProvider>(host: &H, container: NodeId) -> bool {
        host.active_element().is_some_and(|active| host.contains(container, active))
    }
}
