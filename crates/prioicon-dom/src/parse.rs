use scraper::Html;

use crate::document::Document;
use crate::error::DomError;
use crate::mutation::MutationRecord;
use crate::NodeId;

impl Document {
    /// Parse a complete HTML document. Parsing never fails; malformed markup
    /// is repaired the way browsers repair it.
    pub fn parse_html(html: &str) -> Self {
        Self::from_html(Html::parse_document(html))
    }

    /// Parse `html` as a body fragment and append its top-level nodes to
    /// `parent`, queued as a single mutation record.
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        self.check_container(parent)?;
        let fragment = Html::parse_fragment(html);
        let added = self.import(&fragment)?;
        for &id in &added {
            self.node_mut(parent)?.append_id(id);
        }
        if !added.is_empty() {
            self.record(MutationRecord::added(parent, added.clone()));
        }
        Ok(added)
    }

    /// Copy a parsed fragment into this tree, returning its detached top-level nodes.
    fn import(&mut self, fragment: &Html) -> Result<Vec<NodeId>, DomError> {
        // Fragment content sits under a synthetic <html> element.
        let Some(context) = fragment
            .tree
            .root()
            .children()
            .find(|n| n.value().is_element())
        else {
            return Ok(Vec::new());
        };

        let mut top = Vec::new();
        let mut stack = vec![(context, None)];
        while let Some((source, parent)) = stack.pop() {
            for child in source.children() {
                let id = self.orphan(child.value().clone());
                match parent {
                    Some(p) => {
                        self.node_mut(p)?.append_id(id);
                    }
                    None => top.push(id),
                }
                stack.push((child, Some(id)));
            }
        }
        Ok(top)
    }
}
