//! DOM errors

use crate::{ListenerId, NodeId, ObserverId};

/// Errors raised by document operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0:?} has no character data")]
    NotCharacterData(NodeId),

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Cannot insert {child:?} into its own subtree")]
    HierarchyRequest { child: NodeId },

    #[error("Unknown observer: {0:?}")]
    UnknownObserver(ObserverId),

    #[error("Unknown listener: {0:?}")]
    UnknownListener(ListenerId),
}
