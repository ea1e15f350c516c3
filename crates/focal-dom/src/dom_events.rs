//! DOM Events
//!
//! Mutation records, keyboard events and document listener bookkeeping.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::NodeId;

/// DOM event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEventType {
    NodeInserted,
    NodeRemoved,
    AttrModified,
    CharacterDataModified,
}

/// DOM mutation event
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    pub event_type: DomEventType,
    pub target: NodeId,
    pub related_node: Option<NodeId>,
    pub prev_value: Option<String>,
    pub new_value: Option<String>,
    pub attr_name: Option<String>,
}

impl DomEvent {
    fn base(event_type: DomEventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            related_node: None,
            prev_value: None,
            new_value: None,
            attr_name: None,
        }
    }

    /// Create node inserted event
    pub fn node_inserted(target: NodeId, parent: NodeId) -> Self {
        Self {
            related_node: Some(parent),
            ..Self::base(DomEventType::NodeInserted, target)
        }
    }

    /// Create node removed event
    pub fn node_removed(target: NodeId, parent: NodeId) -> Self {
        Self {
            related_node: Some(parent),
            ..Self::base(DomEventType::NodeRemoved, target)
        }
    }

    /// Create attribute modified event
    pub fn attr_modified(
        target: NodeId,
        name: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> Self {
        Self {
            prev_value: old_value.map(str::to_string),
            new_value: new_value.map(str::to_string),
            attr_name: Some(name.to_string()),
            ..Self::base(DomEventType::AttrModified, target)
        }
    }

    /// Create character data modified event
    pub fn char_data_modified(target: NodeId, old_value: &str, new_value: &str) -> Self {
        Self {
            prev_value: Some(old_value.to_string()),
            new_value: Some(new_value.to_string()),
            ..Self::base(DomEventType::CharacterDataModified, target)
        }
    }
}

/// Keyboard event delivered to document-level handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub key: String,
    pub shift_key: bool,
    default_prevented: bool,
}

impl KeyboardEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            shift_key: false,
            default_prevented: false,
        }
    }

    pub fn shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    pub fn tab() -> Self {
        Self::new("Tab")
    }

    pub fn shift_tab() -> Self {
        Self::new("Tab").shift()
    }

    pub fn escape() -> Self {
        Self::new("Escape")
    }

    pub fn is_tab(&self) -> bool {
        self.key == "Tab"
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Kind of document-level listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    KeyDown,
    Click,
}

#[derive(Debug, Default)]
struct ListenerSlots {
    next_id: u64,
    active: Vec<(u64, ListenerKind)>,
}

/// Shared table of attached document listeners
///
/// Handing out a [`Subscription`] attaches a listener; dropping it
/// detaches. The table is single-threaded (`Rc`), like the UI thread it
/// models.
#[derive(Debug, Clone, Default)]
pub struct ListenerTable {
    slots: Rc<RefCell<ListenerSlots>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener of the given kind
    pub fn listen(&self, kind: ListenerKind) -> Subscription {
        let mut slots = self.slots.borrow_mut();
        slots.next_id += 1;
        let id = slots.next_id;
        slots.active.push((id, kind));
        tracing::trace!("listener {} attached ({:?})", id, kind);

        Subscription {
            slots: Rc::downgrade(&self.slots),
            id,
            kind,
        }
    }

    /// Number of attached listeners of a kind
    pub fn count(&self, kind: ListenerKind) -> usize {
        self.slots.borrow().active.iter().filter(|(_, k)| *k == kind).count()
    }
}

/// Attached listener; detaches on drop
#[derive(Debug)]
pub struct Subscription {
    slots: Weak<RefCell<ListenerSlots>>,
    id: u64,
    kind: ListenerKind,
}

impl Subscription {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }

    /// Whether the listener is still attached to a live table
    pub fn is_attached(&self) -> bool {
        let Some(slots) = self.slots.upgrade() else {
            return false;
        };
        let attached = slots.borrow().active.iter().any(|(id, _)| *id == self.id);
        attached
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            if let Ok(mut slots) = slots.try_borrow_mut() {
                slots.active.retain(|(id, _)| *id != self.id);
                tracing::trace!("listener {} detached ({:?})", self.id, self.kind);
            }
        }
    }
}
