use crate::NodeId;

/// One child-list change observed under the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// The node whose children changed
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

impl MutationRecord {
    pub fn added(target: NodeId, added: Vec<NodeId>) -> Self {
        Self {
            target,
            added,
            removed: Vec::new(),
        }
    }

    pub fn removed(target: NodeId, removed: Vec<NodeId>) -> Self {
        Self {
            target,
            added: Vec::new(),
            removed,
        }
    }

    pub fn replaced(target: NodeId, added: NodeId, removed: NodeId) -> Self {
        Self {
            target,
            added: vec![added],
            removed: vec![removed],
        }
    }
}
