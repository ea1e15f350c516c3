//! Host Capabilities
//!
//! The focus layer never reaches for a global document. Everything it needs
//! from the page is expressed here and handed in by the caller;
//! [`focal_dom::Document`] implements all three traits.

use focal_dom::{Document, DomError, ListenerKind, NodeId, SelectorError, Subscription};

/// Read and move keyboard focus
pub trait FocusProvider {
    /// Currently focused element
    fn active_element(&self) -> Option<NodeId>;

    /// Move focus; false when the element cannot take it
    fn focus(&mut self, id: NodeId) -> bool;

    /// Whether the node is attached to the document
    fn is_connected(&self, id: NodeId) -> bool;

    /// Whether `id` is `ancestor` or inside it
    fn contains(&self, ancestor: NodeId, id: NodeId) -> bool;

    /// First match for `selector`
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError>;

    /// Matches under `root`, in document order
    fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId>;

    /// `(offsetWidth, offsetHeight)`
    fn offset_size(&self, id: NodeId) -> (f64, f64);
}

/// Attach document-level listeners
pub trait EventSource {
    fn listen(&mut self, kind: ListenerKind) -> Subscription;

    fn listener_count(&self, kind: ListenerKind) -> usize;
}

/// DOM writes needed to maintain live regions and dialog wiring
pub trait RegionHost: FocusProvider {
    fn body(&self) -> NodeId;

    fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId, DomError>;

    fn get_attribute(&self, id: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError>;

    fn text_content(&self, id: NodeId) -> String;

    fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError>;

    fn remove(&mut self, id: NodeId) -> Result<(), DomError>;
}

impl FocusProvider for Document {
    fn active_element(&self) -> Option<NodeId> {
        Document::active_element(self)
    }

    fn focus(&mut self, id: NodeId) -> bool {
        Document::focus(self, id)
    }

    fn is_connected(&self, id: NodeId) -> bool {
        Document::is_connected(self, id)
    }

    fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        Document::contains(self, ancestor, id)
    }

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        Document::try_query_selector(self, selector)
    }

    fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        Document::query_selector_all(self, root, selector)
    }

    fn offset_size(&self, id: NodeId) -> (f64, f64) {
        Document::offset_size(self, id)
    }
}

impl EventSource for Document {
    fn listen(&mut self, kind: ListenerKind) -> Subscription {
        Document::listen(self, kind)
    }

    fn listener_count(&self, kind: ListenerKind) -> usize {
        Document::listener_count(self, kind)
    }
}

impl RegionHost for Document {
    fn body(&self) -> NodeId {
        Document::body(self)
    }

    fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        Document::append_element(self, parent, tag, attrs)
    }

    fn get_attribute(&self, id: NodeId, name: &str) -> Option<String> {
        Document::get_attribute(self, id, name).map(str::to_string)
    }

    fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        Document::set_attribute(self, id, name, value)
    }

    fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        Document::remove_attribute(self, id, name)
    }

    fn text_content(&self, id: NodeId) -> String {
        Document::text_content(self, id)
    }

    fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        Document::set_text_content(self, id, text)
    }

    fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        Document::remove(self, id)
    }
}
