//! DOM Tree (arena-based allocation)
//!
//! Removing a node only unlinks it; the node and its subtree remain in the
//! arena, so ids held elsewhere stay valid and can be checked with
//! [`DomTree::is_connected`].

use crate::{DomError, Node, NodeId};
use crate::node::ElementData;

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::NoSuchNode(id))
    }

    /// Element data for a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    /// Mutable element data for a node
    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        self.get_mut(id)
            .ok_or(DomError::NoSuchNode(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    /// Parent of a node, if attached to one
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Check whether `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = id;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = match self.get(current) {
                Some(node) => node.parent,
                None => return false,
            };
        }
        false
    }

    /// Check whether a node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.is_inclusive_ancestor(NodeId::ROOT, id)
    }

    /// Append `child` as the last child of `parent`, moving it if needed
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        self.node(child)?;
        if child == NodeId::ROOT || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child)?;
        }

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
        Ok(())
    }

    /// Unlink `child` from `parent`; the subtree stays in the arena
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let (prev, next) = {
            let node = self.node(child)?;
            if node.parent != parent {
                return Err(DomError::NotAChild { parent, child });
            }
            (node.prev_sibling, node.next_sibling)
        };

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[child.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Remove every child of a node
    pub fn clear_children(&mut self, parent: NodeId) -> Result<(), DomError> {
        loop {
            let first = self.node(parent)?.first_child;
            if !first.is_valid() {
                return Ok(());
            }
            self.remove_child(parent, first)?;
        }
    }

    /// Iterate direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    /// Iterate descendants in document (pre-)order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|(_, node)| node.as_text())
            .collect()
    }

    /// Replace the children of `id` with a single text node (none if empty)
    ///
    /// When the only child is already a text node it is rewritten in place,
    /// and kept as an empty text node when `content` is empty.
    pub fn set_text_content(&mut self, id: NodeId, content: &str) -> Result<(), DomError> {
        if let Some(text) = self.lone_text_child(id) {
            if let Some(data) = self.get_mut(text).and_then(Node::as_text_mut) {
                data.content.clear();
                data.content.push_str(content);
            }
            return Ok(());
        }
        self.clear_children(id)?;
        if !content.is_empty() {
            let text = self.create_text(content);
            self.append_child(id, text)?;
        }
        Ok(())
    }

    fn lone_text_child(&self, id: NodeId) -> Option<NodeId> {
        let mut children = self.children(id);
        let (text, node) = children.next()?;
        (node.as_text().is_some() && children.next().is_none()).then_some(text)
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl<'a> Descendants<'a> {
    fn successor(&self, id: NodeId) -> NodeId {
        let Some(node) = self.tree.get(id) else {
            return NodeId::NONE;
        };
        if node.first_child.is_valid() {
            return node.first_child;
        }

        let mut current = id;
        while current.is_valid() && current != self.root {
            let Some(node) = self.tree.get(current) else {
                break;
            };
            if node.next_sibling.is_valid() {
                return node.next_sibling;
            }
            current = node.parent;
        }
        NodeId::NONE
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = self.successor(id);
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_remove() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let a = tree.create_element("a");
        let b = tree.create_element("b");

        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, a).unwrap();
        tree.append_child(div, b).unwrap();

        let kids: Vec<NodeId> = tree.children(div).map(|(id, _)| id).collect();
        assert_eq!(kids, vec![a, b]);

        tree.remove_child(div, a).unwrap();
        let kids: Vec<NodeId> = tree.children(div).map(|(id, _)| id).collect();
        assert_eq!(kids, vec![b]);
        assert!(!tree.is_connected(a));
        assert!(tree.is_connected(b));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        tree.append_child(outer, inner).unwrap();

        assert_eq!(
            tree.append_child(inner, outer),
            Err(DomError::HierarchyRequest { parent: inner, child: outer })
        );
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = DomTree::new();
        let section = tree.create_element("section");
        let p1 = tree.create_element("p");
        let span = tree.create_element("span");
        let p2 = tree.create_element("p");

        tree.append_child(tree.root(), section).unwrap();
        tree.append_child(section, p1).unwrap();
        tree.append_child(p1, span).unwrap();
        tree.append_child(section, p2).unwrap();

        let order: Vec<NodeId> = tree.descendants(section).map(|(id, _)| id).collect();
        assert_eq!(order, vec![p1, span, p2]);

        // Subtree walk must not escape into siblings of the root
        let order: Vec<NodeId> = tree.descendants(p1).map(|(id, _)| id).collect();
        assert_eq!(order, vec![span]);
    }

    #[test]
    fn test_text_content() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.set_text_content(div, "hello").unwrap();
        assert_eq!(tree.text_content(div), "hello");

        let text = tree.children(div).next().map(|(id, _)| id);

        tree.set_text_content(div, "").unwrap();
        assert_eq!(tree.text_content(div), "");
        tree.set_text_content(div, "world").unwrap();
        assert_eq!(tree.text_content(div), "world");
        let children: Vec<_> = tree.children(div).map(|(id, _)| id).collect();
        assert_eq!(children, text.into_iter().collect::<Vec<_>>());
        assert_eq!(tree.len(), 3);

        let span = tree.create_element("span");
        tree.append_child(div, span).unwrap();
        tree.set_text_content(div, "").unwrap();
        assert_eq!(tree.children(div).count(), 0);
    }
}
