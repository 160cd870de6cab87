//! genX DOM - host document model
//!
//! Arena-backed element tree that the configuration parsers read from and
//! the mutation bridge observes. Mutations made through [`Document`] are
//! recorded for every registered observer whose target covers the change.

mod attributes;
mod document;
mod error;
mod node;
mod observer;
mod tree;

pub use attributes::{Attr, NamedNodeMap};
pub use document::{Document, ReadyState, SharedDocument};
pub use error::DomError;
pub use node::{ElementData, Node, NodeData};
pub use observer::{
    ListenerId, MutationKind, MutationObserverInit, MutationRecord, ObserverId, ObserverRegistry,
};
pub use tree::{DomTree, ElementRef};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Build an ID from its raw arena index
    pub const fn from_raw(index: u32) -> Self {
        NodeId(index)
    }

    /// Raw arena index
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check this is not the `NONE` sentinel
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}
