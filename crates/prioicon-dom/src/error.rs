use thiserror::Error;

use crate::NodeId;

#[derive(Error, Debug, PartialEq)]
pub enum DomError {
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Node {0:?} cannot have children")]
    NotAContainer(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Inserting {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}
