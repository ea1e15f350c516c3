//! Document - High-level document API
//!
//! Wraps the tree with the state a browser keeps per document: the focused
//! element, the attached document listeners and a mutation log.

use std::collections::VecDeque;

use crate::dom_events::{DomEvent, ListenerKind, ListenerTable, Subscription};
use crate::geometry::{nominal_size, ElementGeometry};
use crate::selector::{SelectorError, SelectorList};
use crate::{DomError, DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    focused: Option<NodeId>,
    listeners: ListenerTable,
    mutations: VecDeque<DomEvent>,
}

impl Document {
    /// Mutation records kept before the oldest are dropped
    pub const MUTATION_LOG_LIMIT: usize = 256;

    /// Create a document with `<html>`, `<head>` and `<body>`
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes: these appends cannot fail
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            focused: None,
            listeners: ListenerTable::new(),
            mutations: VecDeque::new(),
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get `<head>` element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get `<body>` element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    /// Create an element with attributes and append it to `parent`
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        let id = self.tree.create_element(tag);
        {
            let el = self.tree.element_mut(id)?;
            for (name, value) in attrs {
                el.set_attr(name, value);
            }
        }
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Append `child` to `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let old_parent = self.tree.parent(child);
        self.tree.append_child(parent, child)?;
        if let Some(old_parent) = old_parent {
            self.record(DomEvent::node_removed(child, old_parent));
        }
        self.record(DomEvent::node_inserted(child, parent));
        Ok(())
    }

    /// Remove `child` from `parent`
    ///
    /// If the focused element was inside the removed subtree, focus falls
    /// back to the body the way browsers do.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.tree.remove_child(parent, child)?;
        self.record(DomEvent::node_removed(child, parent));

        if self.focused.is_some_and(|f| self.tree.is_inclusive_ancestor(child, f)) {
            tracing::debug!("focused node removed with {:?}; focus reset", child);
            self.focused = None;
        }
        Ok(())
    }

    /// Detach a node from wherever it is attached
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        match self.tree.parent(id) {
            Some(parent) => self.remove_child(parent, id),
            None => Ok(()),
        }
    }

    /// Get an attribute value
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.element(id)?.get_attr(&name.to_ascii_lowercase())
    }

    /// Check attribute presence
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.tree.element(id).is_some_and(|e| e.has_attr(&name.to_ascii_lowercase()))
    }

    /// Set an attribute
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        let old = self.tree.element_mut(id)?.set_attr(name, value);
        if old.as_deref() != Some(value) {
            self.record(DomEvent::attr_modified(id, name, old.as_deref(), Some(value)));
        }
        Ok(())
    }

    /// Remove an attribute
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        if let Some(old) = self.tree.element_mut(id)?.remove_attr(name) {
            self.record(DomEvent::attr_modified(id, name, Some(&old), None));
        }
        Ok(())
    }

    /// Text content of a node
    pub fn text_content(&self, id: NodeId) -> String {
        self.tree.text_content(id)
    }

    /// Replace text content; records one mutation when the text changes
    ///
    /// A lone text child is rewritten in place, so repeated updates of a
    /// status line do not grow the arena.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        let old = self.tree.text_content(id);
        self.tree.set_text_content(id, text)?;
        if old != text {
            self.record(DomEvent::char_data_modified(id, &old, text));
        }
        Ok(())
    }

    /// Mutation records since the last `take_mutations`, oldest first
    ///
    /// At most `MUTATION_LOG_LIMIT` records are kept.
    pub fn mutations(&self) -> impl Iterator<Item = &DomEvent> {
        self.mutations.iter()
    }

    /// Drain the mutation log
    pub fn take_mutations(&mut self) -> Vec<DomEvent> {
        self.mutations.drain(..).collect()
    }

    fn record(&mut self, event: DomEvent) {
        if self.mutations.len() == Self::MUTATION_LOG_LIMIT {
            self.mutations.pop_front();
        }
        self.mutations.push_back(event);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .find(|(_, node)| node.as_element().is_some_and(|e| e.id.as_deref() == Some(id)))
            .map(|(node_id, _)| node_id)
    }

    /// First connected element matching `selector`
    pub fn try_query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .tree
            .descendants(self.tree.root())
            .map(|(id, _)| id)
            .find(|&id| list.matches(&self.tree, id)))
    }

    /// Elements under `root` matching `selector`, in document order
    pub fn try_query_selector_all(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .tree
            .descendants(root)
            .map(|(id, _)| id)
            .filter(|&id| list.matches(&self.tree, id))
            .collect())
    }

    /// Like `try_query_selector`, logging and ignoring invalid selectors
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.try_query_selector(selector).unwrap_or_else(|e| {
            tracing::warn!("invalid selector {:?}: {}", selector, e);
            None
        })
    }

    /// Like `try_query_selector_all`, logging and ignoring invalid selectors
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        self.try_query_selector_all(root, selector).unwrap_or_else(|e| {
            tracing::warn!("invalid selector {:?}: {}", selector, e);
            Vec::new()
        })
    }

    /// Whether the node is attached to this document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.tree.is_connected(id)
    }

    /// Whether `id` is `ancestor` or inside it
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.tree.is_inclusive_ancestor(ancestor, id)
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Assign an explicit layout box
    pub fn set_geometry(&mut self, id: NodeId, geometry: ElementGeometry) -> Result<(), DomError> {
        self.tree.element_mut(id)?.geometry = Some(geometry);
        Ok(())
    }

    /// Whether the element or an ancestor carries `hidden`
    pub fn is_hidden(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.tree.element(node).is_some_and(|e| e.has_attr("hidden")) {
                return true;
            }
            current = self.tree.parent(node);
        }
        false
    }

    /// `(offsetWidth, offsetHeight)`; zero when detached or hidden
    pub fn offset_size(&self, id: NodeId) -> (f64, f64) {
        let Some(el) = self.tree.element(id) else {
            return (0.0, 0.0);
        };
        if !self.is_connected(id) || self.is_hidden(id) {
            return (0.0, 0.0);
        }
        match el.geometry {
            Some(g) => (g.offset_width, g.offset_height),
            None => nominal_size(&el.tag),
        }
    }

    /// Whether the element occupies any space
    pub fn is_rendered(&self, id: NodeId) -> bool {
        let (w, h) = self.offset_size(id);
        w > 0.0 || h > 0.0
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    /// Whether `focus()` on this element would take effect
    pub fn is_focusable(&self, id: NodeId) -> bool {
        let Some(el) = self.tree.element(id) else {
            return false;
        };
        if !self.is_rendered(id) {
            return false;
        }
        let tabindex = el.get_attr("tabindex").and_then(|v| v.trim().parse::<i32>().ok());
        if tabindex.is_some() {
            return !el.has_attr("disabled");
        }
        match el.tag.as_str() {
            "a" => el.has_attr("href"),
            "button" | "input" | "select" | "textarea" => !el.has_attr("disabled"),
            _ => el.get_attr("contenteditable") == Some("true"),
        }
    }

    /// The focused element, or `<body>` when nothing connected has focus
    pub fn active_element(&self) -> Option<NodeId> {
        self.focused
            .filter(|&id| self.is_connected(id))
            .or_else(|| Some(self.body_element).filter(|b| b.is_valid()))
    }

    /// Move focus to `id`; returns false (and leaves focus alone) when the
    /// element is detached or not focusable
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.is_connected(id) || !self.is_focusable(id) {
            tracing::trace!("focus({:?}) ignored", id);
            return false;
        }
        self.focused = Some(id);
        true
    }

    /// Drop focus back to the body
    pub fn blur(&mut self) {
        self.focused = None;
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Attach a document-level listener
    pub fn listen(&self, kind: ListenerKind) -> Subscription {
        self.listeners.listen(kind)
    }

    /// Number of attached document-level listeners of a kind
    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.listeners.count(kind)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        let doc = Document::default();
        assert_eq!(doc.url(), "about:blank");
        assert!(doc.is_connected(doc.body()));
        assert_eq!(doc.active_element(), Some(doc.body()));
    }

    #[test]
    fn test_focus_rules() {
        let mut doc = Document::default();
        let body = doc.body();
        let button = doc.append_element(body, "button", &[]).unwrap();
        let disabled = doc.append_element(body, "button", &[("disabled", "")]).unwrap();
        let div = doc.append_element(body, "div", &[]).unwrap();
        let region = doc.append_element(body, "div", &[("tabindex", "-1")]).unwrap();

        assert!(doc.focus(button));
        assert_eq!(doc.active_element(), Some(button));
        assert!(!doc.focus(disabled));
        assert!(!doc.focus(div));
        assert_eq!(doc.active_element(), Some(button));
        assert!(doc.focus(region));
    }

    #[test]
    fn test_removing_focused_subtree_resets_focus() {
        let mut doc = Document::default();
        let body = doc.body();
        let panel = doc.append_element(body, "div", &[]).unwrap();
        let button = doc.append_element(panel, "button", &[]).unwrap();

        assert!(doc.focus(button));
        doc.remove(panel).unwrap();
        assert!(!doc.is_connected(button));
        assert_eq!(doc.active_element(), Some(body));
        assert!(!doc.focus(button));
    }

    #[test]
    fn test_hidden_elements_have_no_size() {
        let mut doc = Document::default();
        let body = doc.body();
        let dialog = doc.append_element(body, "div", &[("hidden", "")]).unwrap();
        let button = doc.append_element(dialog, "button", &[]).unwrap();

        assert_eq!(doc.offset_size(button), (0.0, 0.0));
        assert!(!doc.focus(button));

        doc.remove_attribute(dialog, "hidden").unwrap();
        assert!(doc.is_rendered(button));
        assert!(doc.focus(button));
    }

    #[test]
    fn test_text_mutations_recorded() {
        let mut doc = Document::default();
        let body = doc.body();
        let status = doc.append_element(body, "div", &[]).unwrap();
        doc.take_mutations();

        doc.set_text_content(status, "Saved").unwrap();
        doc.set_text_content(status, "Saved").unwrap();
        doc.set_text_content(status, "").unwrap();

        let changes: Vec<_> = doc
            .take_mutations()
            .into_iter()
            .filter_map(|m| m.new_value)
            .collect();
        assert_eq!(changes, vec!["Saved".to_string(), String::new()]);
    }

    #[test]
    fn test_status_updates_reuse_text_node() {
        let mut doc = Document::default();
        let body = doc.body();
        let status = doc.append_element(body, "div", &[]).unwrap();
        doc.set_text_content(status, "Saved").unwrap();
        let nodes = doc.tree().len();

        for n in 0..1000 {
            doc.set_text_content(status, "").unwrap();
            doc.set_text_content(status, &format!("Saved {}", n)).unwrap();
        }

        assert_eq!(doc.tree().len(), nodes);
        assert_eq!(doc.text_content(status), "Saved 999");
        assert_eq!(doc.mutations().count(), Document::MUTATION_LOG_LIMIT);
        let last = doc.mutations().last().and_then(|m| m.new_value.clone());
        assert_eq!(last.as_deref(), Some("Saved 999"));
    }

    #[test]
    fn test_invalid_selector_is_none() {
        let doc = Document::default();
        assert!(doc.try_query_selector("div:hover").is_err());
        assert_eq!(doc.query_selector("div:hover"), None);
    }
}
