//! Focal Accessibility
//!
//! Keyboard focus management and screen-reader announcements on top of
//! `focal-dom`.
//!
//! Features:
//! - Focus snapshot/restore and initial focus
//! - Single-holder Tab trap for modal regions
//! - Modal open/close state machine with Escape and outside-click dismissal
//! - Polite/assertive live region announcements
//! - Skip links and focus after dynamic updates

pub mod aria;
pub mod dynamic;
pub mod focus;
pub mod focus_return;
pub mod host;
pub mod live_region;
pub mod modal;
pub mod runtime;
pub mod scheduler;
pub mod skip_link;
pub mod trap;

pub use aria::{AriaRole, DialogAria, LiveAttributes, LiveRegionMode};
pub use dynamic::{DynamicFocus, DynamicFocusOptions};
pub use focus::{
    FOCUSABLE_SELECTOR, FocusIndicator, FocusManager, FocusOptions, FocusStyle, InitialFocus,
    TabIndex, focusable_elements, move_focus, restore_if_connected, tab_order,
};
pub use focus_return::FocusReturnGuard;
pub use host::{EventSource, FocusProvider, RegionHost};
pub use live_region::{Announcement, AnnouncerConfig, LiveAnnouncer};
pub use modal::{CloseReason, ModalFocusController, ModalKeyOutcome, ModalOptions, ModalState};
pub use runtime::{Deferred, FocusRuntime};
pub use scheduler::Scheduler;
pub use skip_link::{SkipLink, SkipLinks};
pub use trap::{TrapLease, TrapOutcome, TrapRegistry, wrap_tab};

use focal_dom::{DomError, NodeId, SelectorError};

/// Accessibility error
#[derive(Debug, thiserror::Error)]
pub enum A11yError {
    #[error("invalid selector: {0}")]
    InvalidSelector(#[from] SelectorError),

    #[error("no element matches {0:?}")]
    TargetNotFound(String),

    #[error("element {0:?} is not in the document")]
    Detached(NodeId),

    #[error(transparent)]
    Dom(#[from] DomError),
}
