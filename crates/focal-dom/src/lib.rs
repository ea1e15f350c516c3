//! Focal DOM - Document Object Model
//!
//! Arena-based DOM tree used as the focus host for Focal:
//! - Node links stored as `NodeId` indices
//! - Attribute selectors (`querySelector` subset)
//! - Active element tracking and connectivity checks
//! - Mutation log and listener bookkeeping

mod node;
mod tree;
mod document;
mod selector;
mod geometry;
mod dom_events;

pub use node::{Node, NodeData, ElementData, TextData, Attribute};
pub use tree::{DomTree, Children, Descendants};
pub use document::Document;
pub use selector::{SelectorList, Selector, Compound, SimpleSelector, SelectorError};
pub use geometry::ElementGeometry;
pub use dom_events::{
    DomEvent, DomEventType, KeyboardEvent, ListenerKind, ListenerTable, Subscription,
};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this is not the `NONE` sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM operation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("no such node: {0:?}")]
    NoSuchNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("cannot insert {child:?} under {parent:?}: would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
