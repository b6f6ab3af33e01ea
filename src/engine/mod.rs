//! Scan-and-replace pass over a document.
//!
//! A pass resolves its scan roots, collects every matching text node
//! without touching the tree, then replaces the collected nodes in document
//! order. Replacements are marked, so a second pass over the same tree
//! changes nothing.

pub mod matcher;
pub mod roots;
pub mod wrapper;

use std::sync::Arc;

use prioicon_core::{PriorityConfiguration, PriorityVisual};
use prioicon_dom::{Document, NodeId};

use crate::error::EngineError;

pub use matcher::TextMatcher;
pub use roots::{ResolvedRoots, ScanRoots, DEFAULT_SCAN_ROOTS};

/// Parents whose text content is never transformed.
const PROTECTED_PARENTS: &[&str] = &[
    "script", "style", "noscript", "textarea", "input", "select", "option", "button",
];

/// Summary of one scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub roots: usize,
    pub used_fallback: bool,
    pub candidates: usize,
    pub replaced: usize,
    pub skipped_detached: usize,
    pub skipped_protected: usize,
    pub skipped_marked: usize,
}

impl ScanReport {
    pub fn skipped(&self) -> usize {
        self.skipped_detached + self.skipped_protected + self.skipped_marked
    }
}

/// A pass the page runtime can drive.
pub trait ScanPass: Send {
    fn scan(&self, doc: &mut Document) -> Result<ScanReport, EngineError>;

    fn config(&self) -> &PriorityConfiguration;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Replaced,
    Detached,
    Protected,
    AlreadyMarked,
}

/// Replaces priority text with icon wrappers.
#[derive(Debug, Clone)]
pub struct Engine {
    matcher: TextMatcher,
    roots: ScanRoots,
}

impl Engine {
    pub fn new(config: PriorityConfiguration, roots: ScanRoots) -> Self {
        Self {
            matcher: TextMatcher::new(Arc::new(config)),
            roots,
        }
    }

    pub fn config(&self) -> &PriorityConfiguration {
        self.matcher.config()
    }

    /// Run one scan-and-replace pass.
    pub fn scan(&self, doc: &mut Document) -> Result<ScanReport, EngineError> {
        let resolved = self.roots.resolve(doc);
        let candidates = self.collect(doc, &resolved.nodes);

        let mut report = ScanReport {
            roots: resolved.nodes.len(),
            used_fallback: resolved.fallback,
            candidates: candidates.len(),
            ..ScanReport::default()
        };

        for (node, visual) in candidates {
            match self.apply(doc, node, visual)? {
                Outcome::Replaced => report.replaced += 1,
                Outcome::Detached => report.skipped_detached += 1,
                Outcome::Protected => report.skipped_protected += 1,
                Outcome::AlreadyMarked => report.skipped_marked += 1,
            }
        }

        Ok(report)
    }

    /// Collect phase: matching text nodes under `roots`, in document order.
    fn collect(&self, doc: &Document, roots: &[NodeId]) -> Vec<(NodeId, &PriorityVisual)> {
        roots
            .iter()
            .flat_map(|&root| doc.descendants(root))
            .filter_map(|node| {
                let text = doc.text(node)?;
                self.matcher.accept(text).map(|visual| (node, visual))
            })
            .collect()
    }

    /// Apply phase for a single collected node.
    fn apply(
        &self,
        doc: &mut Document,
        node: NodeId,
        visual: &PriorityVisual,
    ) -> Result<Outcome, EngineError> {
        let Some(parent) = doc.parent(node) else {
            return Ok(Outcome::Detached);
        };
        if doc
            .tag_name(parent)
            .is_some_and(|tag| PROTECTED_PARENTS.contains(&tag))
        {
            return Ok(Outcome::Protected);
        }
        if wrapper::marked_ancestor(doc, node).is_some() {
            return Ok(Outcome::AlreadyMarked);
        }

        let replacement = wrapper::build(doc, visual)?;
        doc.replace_child(parent, replacement, node)?;
        Ok(Outcome::Replaced)
    }
}

impl ScanPass for Engine {
    fn scan(&self, doc: &mut Document) -> Result<ScanReport, EngineError> {
        Engine::scan(self, doc)
    }

    fn config(&self) -> &PriorityConfiguration {
        Engine::config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prioicon_dom::Selector;

    fn engine() -> Engine {
        Engine::new(PriorityConfiguration::defaults(), ScanRoots::default())
    }

    fn wrappers(doc: &Document) -> Vec<NodeId> {
        doc.select(&Selector::parse("[data-priority-icon]").unwrap())
    }

    #[test]
    fn test_replaces_in_document_order() {
        let mut doc = Document::parse_html(
            "<body><p>Low</p><div><span>High</span></div><p>Emergency</p></body>",
        );
        let report = engine().scan(&mut doc).unwrap();

        assert!(report.used_fallback);
        assert_eq!(report.replaced, 3);
        let names: Vec<_> = wrappers(&doc)
            .into_iter()
            .map(|w| doc.attribute(w, wrapper::MARKER_ATTR).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Low", "High", "Emergency"]);
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let mut doc = Document::parse_html("<body><p>Normal</p></body>");
        let engine = engine();
        engine.scan(&mut doc).unwrap();
        let once = doc.to_html();
        doc.take_records();

        let report = engine.scan(&mut doc).unwrap();

        assert_eq!(doc.to_html(), once);
        assert_eq!(report.replaced, 0);
        // the hidden label is found by the traversal but sits inside a wrapper
        assert_eq!(report.skipped_marked, 1);
        assert_eq!(doc.pending_records(), 0);
    }

    #[test]
    fn test_protected_parents_skipped() {
        let mut doc = Document::parse_html(
            "<body><script>Emergency</script><style>Low</style><textarea>High</textarea>\
             <select><option>Normal</option></select><button>Low</button></body>",
        );
        let before = doc.to_html();
        let report = engine().scan(&mut doc).unwrap();

        assert_eq!(report.replaced, 0);
        assert_eq!(report.skipped_protected, 5);
        assert_eq!(doc.to_html(), before);
    }

    #[test]
    fn test_only_roots_scanned_when_present() {
        let mut doc = Document::parse_html(
            r#"<body><p>High</p><table class="list queue tickets"><tr><td>Low</td></tr></table></body>"#,
        );
        let report = engine().scan(&mut doc).unwrap();

        assert!(!report.used_fallback);
        assert_eq!(report.replaced, 1);
        let body = doc.body().unwrap();
        assert!(doc.inner_html(body).unwrap().starts_with("<p>High</p>"));
    }

    #[test]
    fn test_unknown_names_left_untouched() {
        let mut doc = Document::parse_html("<body><p>Critical</p><p>Urgent</p></body>");
        let before = doc.to_html();
        let report = engine().scan(&mut doc).unwrap();

        assert_eq!(report.candidates, 0);
        assert_eq!(doc.to_html(), before);
    }

    #[test]
    fn test_custom_configuration_names() {
        let config = PriorityConfiguration::from_visuals(
            vec![PriorityVisual::new("Urgente", "#112233", "priority-urgent", "bolt")],
            false,
        )
        .unwrap();
        let engine = Engine::new(config, ScanRoots::body_only());
        let mut doc = Document::parse_html("<body><p>Urgente</p><p>Emergency</p></body>");

        let report = engine.scan(&mut doc).unwrap();
        assert_eq!(report.replaced, 1);
        assert!(doc.to_html().contains("<p>Emergency</p>"));
    }
}
