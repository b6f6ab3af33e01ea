use ego_tree::{NodeMut, NodeRef};
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::{Element, Text};
use scraper::{CaseSensitivity, ElementRef, Html, Node, Selector, StrTendril};

use crate::error::DomError;
use crate::mutation::MutationRecord;
use crate::NodeId;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A parsed HTML document that records its own child-list changes.
///
/// The tree is a [`scraper::Html`]. Edits made through this type whose
/// target is connected to the root are queued as [`MutationRecord`]s;
/// building detached subtrees records nothing.
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
    records: Vec<MutationRecord>,
}

impl Document {
    pub fn new() -> Self {
        Self::from_html(Html::new_document())
    }

    pub fn from_html(html: Html) -> Self {
        Self {
            html,
            records: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.html.tree.root().id()
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    pub fn data(&self, id: NodeId) -> Option<&Node> {
        self.node(id).map(|n| n.value())
    }

    pub fn element_ref(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.node(id).and_then(ElementRef::wrap)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent().map(|p| p.id())
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.data(id)?.as_element()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::name)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .is_some_and(|el| el.has_class(class, CaseSensitivity::CaseSensitive))
    }

    /// Content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.data(id)?.as_text().map(|text| &**text)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Pre-order traversal of the subtree below `id`, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.descendants().skip(1))
            .map(|n| n.id())
    }

    /// Ancestors of `id`, nearest first, excluding `id`.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.ancestors())
            .map(|n| n.id())
    }

    /// The nearest node, starting at `id` itself, that satisfies `pred`.
    pub fn closest(&self, id: NodeId, pred: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| pred(n))
    }

    /// Whether the node is attached (transitively) to the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).any(|n| n == self.root())
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.ancestors(id).any(|n| n == ancestor)
    }

    /// The first `body` element in document order.
    pub fn body(&self) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|&n| self.tag_name(n) == Some("body"))
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.element_ref(id)
            .is_some_and(|el| selector.matches(&el))
    }

    /// Connected elements matching `selector`, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(self.root())
            .filter(|&n| self.matches(n, selector))
            .collect()
    }

    pub fn select_first(&self, selector: &Selector) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|&n| self.matches(n, selector))
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.html.html()
    }

    /// Serialize an element including its own tag.
    pub fn outer_html(&self, id: NodeId) -> Option<String> {
        self.element_ref(id).map(|el| el.html())
    }

    /// Serialize the children of an element.
    pub fn inner_html(&self, id: NodeId) -> Option<String> {
        self.element_ref(id).map(|el| el.inner_html())
    }

    // ------------------------------------------------------------------
    // Construction and mutation
    // ------------------------------------------------------------------

    pub(crate) fn orphan(&mut self, node: Node) -> NodeId {
        self.html.tree.orphan(node).id()
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        let name = QualName::new(
            None,
            Namespace::from(HTML_NAMESPACE),
            LocalName::from(name.to_ascii_lowercase()),
        );
        self.orphan(Node::Element(Element::new(name, Vec::new())))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.orphan(Node::Text(Text {
            text: StrTendril::from_slice(text),
        }))
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let mut node = self.node_mut(id)?;
        let Node::Element(el) = node.value() else {
            return Err(DomError::NotAnElement(id));
        };

        let name = QualName::new(None, Namespace::from(""), LocalName::from(name.to_ascii_lowercase()));
        let mut attrs: Vec<Attribute> = el
            .attrs
            .iter()
            .map(|(k, v)| Attribute {
                name: k.clone(),
                value: (&**v).into(),
            })
            .collect();
        match attrs.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value.into(),
            None => attrs.push(Attribute {
                name,
                value: value.into(),
            }),
        }
        // Rebuilt rather than patched so the cached id and class list follow.
        *el = Element::new(el.name.clone(), attrs);
        Ok(())
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.node_mut(parent)?.append_id(child);
        self.record(MutationRecord::added(parent, vec![child]));
        Ok(())
    }

    /// Replace `old` (a child of `parent`) with `new` at the same position.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new: NodeId,
        old: NodeId,
    ) -> Result<(), DomError> {
        self.check_exists(old)?;
        self.check_insert(parent, new)?;
        if self.parent(old) != Some(parent) {
            return Err(DomError::NotAChild { parent, child: old });
        }
        if new == old {
            return Ok(());
        }
        self.detach(new);
        let mut old_node = self.node_mut(old)?;
        old_node.insert_id_before(new);
        old_node.detach();
        self.record(MutationRecord::replaced(parent, new, old));
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_exists(parent)?;
        self.check_exists(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(())
    }

    /// Drain the queued mutation records.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn pending_records(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<NodeMut<'_, Node>, DomError> {
        self.html.tree.get_mut(id).ok_or(DomError::NodeNotFound(id))
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Ok(mut node) = self.node_mut(child) {
            node.detach();
        }
        self.record(MutationRecord::removed(parent, vec![child]));
    }

    fn check_exists(&self, id: NodeId) -> Result<(), DomError> {
        match self.node(id) {
            Some(_) => Ok(()),
            None => Err(DomError::NodeNotFound(id)),
        }
    }

    pub(crate) fn check_container(&self, id: NodeId) -> Result<(), DomError> {
        match self.data(id) {
            Some(Node::Document | Node::Fragment | Node::Element(_)) => Ok(()),
            Some(_) => Err(DomError::NotAContainer(id)),
            None => Err(DomError::NodeNotFound(id)),
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_container(parent)?;
        self.check_exists(child)?;
        if child == self.root() || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }
        Ok(())
    }

    pub(crate) fn record(&mut self, record: MutationRecord) {
        if self.is_connected(record.target) {
            self.records.push(record);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        doc.append_child(doc.root(), body).unwrap();
        let td = doc.create_element("td");
        doc.append_child(body, td).unwrap();
        let text = doc.create_text("Emergency");
        doc.append_child(td, text).unwrap();
        doc.take_records();
        (doc, body, td, text)
    }

    #[test]
    fn test_descendants_in_document_order() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let c = doc.create_element("c");
        let d = doc.create_element("d");
        doc.append_child(doc.root(), a).unwrap();
        doc.append_child(a, b).unwrap();
        doc.append_child(b, c).unwrap();
        doc.append_child(a, d).unwrap();

        let order: Vec<_> = doc.descendants(doc.root()).collect();
        assert_eq!(order, vec![a, b, c, d]);
    }

    #[test]
    fn test_replace_child_records_and_detaches() {
        let (mut doc, _body, td, text) = sample();
        let span = doc.create_element("span");
        doc.replace_child(td, span, text).unwrap();

        assert_eq!(doc.children(td), vec![span]);
        assert_eq!(doc.parent(text), None);
        assert!(!doc.is_connected(text));
        assert_eq!(
            doc.take_records(),
            vec![MutationRecord::replaced(td, span, text)]
        );
    }

    #[test]
    fn test_replace_child_keeps_position() {
        let mut doc = Document::parse_html("<body><p>a</p><p>Low</p><p>c</p></body>");
        let body = doc.body().unwrap();
        let middle = doc.children(body)[1];
        let text = doc.children(middle)[0];
        let span = doc.create_element("span");

        doc.replace_child(middle, span, text).unwrap();

        assert_eq!(
            doc.inner_html(body).unwrap(),
            "<p>a</p><p><span></span></p><p>c</p>"
        );
    }

    #[test]
    fn test_detached_construction_is_not_recorded() {
        let (mut doc, body, _td, _text) = sample();
        let wrapper = doc.create_element("span");
        let inner = doc.create_text("x");
        doc.append_child(wrapper, inner).unwrap();
        assert_eq!(doc.pending_records(), 0);

        doc.append_child(body, wrapper).unwrap();
        assert_eq!(doc.take_records(), vec![MutationRecord::added(body, vec![wrapper])]);
    }

    #[test]
    fn test_replace_child_rejects_non_child() {
        let (mut doc, body, _td, text) = sample();
        let span = doc.create_element("span");
        assert_eq!(
            doc.replace_child(body, span, text),
            Err(DomError::NotAChild {
                parent: body,
                child: text
            })
        );
    }

    #[test]
    fn test_cycles_rejected() {
        let (mut doc, body, td, text) = sample();
        assert_eq!(
            doc.append_child(td, body),
            Err(DomError::Cycle {
                parent: td,
                child: body
            })
        );
        assert_eq!(doc.append_child(text, td), Err(DomError::NotAContainer(text)));
    }

    #[test]
    fn test_closest_and_text_content() {
        let (mut doc, body, td, text) = sample();
        doc.set_attribute(td, "class", "cell").unwrap();

        assert_eq!(doc.closest(text, |n| doc.has_class(n, "cell")), Some(td));
        assert_eq!(doc.closest(text, |n| n == text), Some(text));
        assert_eq!(doc.closest(text, |n| doc.has_class(n, "missing")), None);
        assert_eq!(doc.text_content(body), "Emergency");
        assert_eq!(doc.body(), Some(body));
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut doc = Document::parse_html(r#"<body><p id="a" class="x">t</p></body>"#);
        let p = doc.children(doc.body().unwrap())[0];
        assert!(doc.has_class(p, "x"));

        doc.set_attribute(p, "CLASS", "y z").unwrap();
        doc.set_attribute(p, "title", "t").unwrap();

        assert!(!doc.has_class(p, "x"));
        assert!(doc.has_class(p, "z"));
        assert_eq!(
            doc.outer_html(p).unwrap(),
            r#"<p id="a" class="y z" title="t">t</p>"#
        );
    }

    #[test]
    fn test_set_attribute_on_text_fails() {
        let (mut doc, _body, _td, text) = sample();
        assert_eq!(
            doc.set_attribute(text, "class", "x"),
            Err(DomError::NotAnElement(text))
        );
    }

    #[test]
    fn test_serialize_escapes() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.append_child(doc.root(), p).unwrap();
        doc.set_attribute(p, "title", "a \"b\" & c").unwrap();
        let text = doc.create_text("1 < 2 & 3");
        doc.append_child(p, text).unwrap();

        assert_eq!(
            doc.outer_html(p).unwrap(),
            r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp; 3</p>"#
        );
        assert_eq!(doc.outer_html(text), None);
    }

    #[test]
    fn test_void_and_raw_text_elements() {
        let doc = Document::parse_html(
            "<body><br><input value=\"x\"><script>if (a < b) {}</script></body>",
        );
        let body = doc.body().unwrap();
        assert_eq!(
            doc.inner_html(body).unwrap(),
            "<br><input value=\"x\"><script>if (a < b) {}</script>"
        );
    }

    #[test]
    fn test_detached_nodes_not_serialized() {
        let mut doc = Document::parse_html("<!DOCTYPE html><html><head></head><body></body></html>");
        let orphan = doc.create_element("p");
        let text = doc.create_text("High");
        doc.append_child(orphan, text).unwrap();

        assert_eq!(
            doc.to_html(),
            "<!DOCTYPE html><html><head></head><body></body></html>"
        );
    }
}
