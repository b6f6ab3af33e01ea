use prioicon_dom::{parse_selector, Document, DomError, NodeId, Selector};

/// Scan-root selectors used when a deployment names none: the ticket queue,
/// ticket info panels, the status widget, and the partial-navigation container.
pub const DEFAULT_SCAN_ROOTS: &[&str] = &[
    "table.list.queue.tickets",
    "table.ticket_info",
    "#ticket-status",
    "#pjax-container",
];

/// Prioritized list of container selectors the engine searches.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRoots {
    sources: Vec<String>,
    selectors: Vec<Selector>,
}

/// Roots chosen for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoots {
    /// Disjoint subtrees, in document order
    pub nodes: Vec<NodeId>,
    /// True when no selector matched and the body (or the whole document) is scanned
    pub fallback: bool,
}

impl ScanRoots {
    pub fn parse<I, S>(sources: I) -> Result<Self, DomError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roots = Self::body_only();
        for source in sources {
            roots.push(source.as_ref())?;
        }
        Ok(roots)
    }

    /// Always scan the body.
    pub fn body_only() -> Self {
        Self {
            sources: Vec::new(),
            selectors: Vec::new(),
        }
    }

    fn push(&mut self, source: &str) -> Result<(), DomError> {
        self.selectors.push(parse_selector(source)?);
        self.sources.push(source.to_string());
        Ok(())
    }

    /// Selector sources, in priority order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Find the containers to scan in the current document.
    ///
    /// Containers nested inside another matched container are dropped, so
    /// no subtree is visited twice. Without any match the body is scanned
    /// exactly once, falling back to the document root when there is no body.
    pub fn resolve(&self, doc: &Document) -> ResolvedRoots {
        let mut nodes: Vec<NodeId> = Vec::new();
        if !self.selectors.is_empty() {
            for candidate in doc.descendants(doc.root()) {
                if !self.selectors.iter().any(|s| doc.matches(candidate, s)) {
                    continue;
                }
                // document order: any enclosing root was already kept
                if nodes.iter().any(|&kept| doc.is_inclusive_ancestor(kept, candidate)) {
                    continue;
                }
                nodes.push(candidate);
            }
        }

        if nodes.is_empty() {
            return ResolvedRoots {
                nodes: vec![doc.body().unwrap_or_else(|| doc.root())],
                fallback: true,
            };
        }
        ResolvedRoots {
            nodes,
            fallback: false,
        }
    }
}

impl Default for ScanRoots {
    fn default() -> Self {
        let mut roots = Self::body_only();
        for source in DEFAULT_SCAN_ROOTS {
            if let Err(e) = roots.push(source) {
                tracing::warn!("Skipping default scan root: {}", e);
            }
        }
        roots
    }
}
