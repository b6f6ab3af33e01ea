use prioicon_dom::{Document, MutationRecord, NodeId};

use crate::engine::wrapper;

/// Subscription over the page's child-list mutations.
///
/// Only child-list changes inside the body count. Batches whose only
/// additions are the engine's own wrappers (or nodes inside them) are
/// ignored, which keeps a pass from re-triggering itself.
#[derive(Debug, Default)]
pub struct MutationWatcher {
    armed: bool,
}

impl MutationWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start reacting to batches; called once the initial pass has run.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether this batch should schedule a rescan.
    pub fn wants_rescan(&self, doc: &Document, records: &[MutationRecord]) -> bool {
        if !self.armed {
            return false;
        }
        let observed = doc.body().unwrap_or_else(|| doc.root());
        records
            .iter()
            .filter(|record| doc.is_inclusive_ancestor(observed, record.target))
            .flat_map(|record| record.added.iter())
            .any(|&node| !is_own_insertion(doc, node))
    }
}

fn is_own_insertion(doc: &Document, node: NodeId) -> bool {
    wrapper::marked_ancestor(doc, node).is_some()
}
