//! Dynamic Content Focus
//!
//! Keeps focus somewhere sensible when a list or panel re-renders, and
//! announces the change.

use serde::Deserialize;

use focal_dom::NodeId;

use crate::focus::restore_if_connected;
use crate::host::RegionHost;
use crate::live_region::LiveAnnouncer;
use crate::runtime::Deferred;
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DynamicFocusOptions {
    pub focus_on_update: bool,
    pub announce_changes: bool,
    /// Selector focused after an update, if it matches
    pub focus_target: Option<String>,
}

impl Default for DynamicFocusOptions {
    fn default() -> Self {
        Self {
            focus_on_update: true,
            announce_changes: true,
            focus_target: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct DynamicFocus {
    options: DynamicFocusOptions,
    previous: Option<NodeId>,
}

impl DynamicFocus {
    pub fn new(options: DynamicFocusOptions) -> Self {
        Self { options, previous: None }
    }

    pub fn options(&self) -> &DynamicFocusOptions {
        &self.options
    }

    /// Remember focus before the content changes
    pub fn store_focus<H: RegionHost>(&mut self, host: &H) {
        self.previous = host.active_element();
    }

    /// Put focus back after the content changed
    ///
    /// The configured target wins if it matches; otherwise the stored
    /// element is refocused if it survived the update.
    pub fn after_update<H: RegionHost>(&mut self, host: &mut H) -> Option<NodeId> {
        if !self.options.focus_on_update {
            return None;
        }

        if let Some(selector) = &self.options.focus_target {
            match host.query_selector(selector) {
                Ok(Some(target)) if host.focus(target) => return Some(target),
                Ok(_) => tracing::debug!("update focus target {} not focusable", selector),
                Err(e) => tracing::warn!("update focus target {:?}: {}", selector, e),
            }
        }

        self.previous.filter(|&prev| restore_if_connected(host, prev))
    }

    /// Announce the change politely, if enabled
    pub fn announce_update<H: RegionHost>(
        &self,
        announcer: &mut LiveAnnouncer,
        host: &mut H,
        scheduler: &mut Scheduler<Deferred>,
        message: &str,
    ) -> bool {
        if !self.options.announce_changes {
            return false;
        }
        announcer.announce_polite(host, scheduler, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live_region::AnnouncerConfig;
    use focal_dom::Document;

    fn list_page() -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::default();
        let body = doc.body();
        let input = doc.append_element(body, "input", &[("id", "new-todo")]).unwrap();
        let list = doc.append_element(body, "ul", &[]).unwrap();
        let buttons = (0..2)
            .map(|_| {
                let li = doc.append_element(list, "li", &[]).unwrap();
                doc.append_element(li, "button", &[]).unwrap()
            })
            .collect();
        (doc, input, buttons)
    }

    #[test]
    fn test_restores_surviving_element() {
        let (mut doc, _, buttons) = list_page();
        let mut dynamic = DynamicFocus::default();

        doc.focus(buttons[1]);
        dynamic.store_focus(&doc);
        doc.blur();
        assert_eq!(dynamic.after_update(&mut doc), Some(buttons[1]));
        assert_eq!(doc.active_element(), Some(buttons[1]));
    }

    #[test]
    fn test_removed_element_not_restored() {
        let (mut doc, _, buttons) = list_page();
        let mut dynamic = DynamicFocus::default();

        doc.focus(buttons[0]);
        dynamic.store_focus(&doc);
        doc.remove(buttons[0]).unwrap();
        assert_eq!(dynamic.after_update(&mut doc), None);
    }

    #[test]
    fn test_focus_target_wins() {
        let (mut doc, input, buttons) = list_page();
        let mut dynamic = DynamicFocus::new(DynamicFocusOptions {
            focus_target: Some("#new-todo".into()),
            ..Default::default()
        });

        doc.focus(buttons[0]);
        dynamic.store_focus(&doc);
        assert_eq!(dynamic.after_update(&mut doc), Some(input));
    }

    #[test]
    fn test_disabled_options() {
        let (mut doc, _, buttons) = list_page();
        let mut sched = Scheduler::new();
        let mut announcer = LiveAnnouncer::new(AnnouncerConfig::default());
        let mut dynamic = DynamicFocus::new(DynamicFocusOptions {
            focus_on_update: false,
            announce_changes: false,
            focus_target: None,
        });

        doc.focus(buttons[0]);
        dynamic.store_focus(&doc);
        assert_eq!(dynamic.after_update(&mut doc), None);
        assert!(!dynamic.announce_update(&mut announcer, &mut doc, &mut sched, "List updated"));
        assert!(announcer.region().is_none());
    }
}
