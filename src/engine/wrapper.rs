use prioicon_core::{PriorityVisual, ICON_CLASS, SR_ONLY_CLASS, WRAPPER_CLASS};
use prioicon_dom::{Document, DomError, NodeId};

/// Attribute carried by every generated wrapper; its value is the matched name.
pub const MARKER_ATTR: &str = "data-priority-icon";
/// Attribute on the icon element exposing the color as a styling hook.
pub const COLOR_ATTR: &str = "data-priority-color";

/// Build a detached wrapper for `visual`:
///
/// ```html
/// <span class="priority-icon-wrapper" data-priority-icon="Emergency">
///   <span class="priority-icon priority-emergency" data-priority-color="#dc3545"
///         style="color: #dc3545" data-icon="exclamation-triangle" role="img"
///         title="Emergency" aria-label="Priority: Emergency"></span>
///   <span class="priority-sr-only">Emergency</span>
/// </span>
/// ```
pub fn build(doc: &mut Document, visual: &PriorityVisual) -> Result<NodeId, DomError> {
    let wrapper = doc.create_element("span");
    doc.set_attribute(wrapper, "class", WRAPPER_CLASS)?;
    doc.set_attribute(wrapper, MARKER_ATTR, &visual.name)?;

    let icon = doc.create_element("span");
    doc.set_attribute(icon, "class", &format!("{} {}", ICON_CLASS, visual.css_class))?;
    doc.set_attribute(icon, COLOR_ATTR, &visual.color_hex)?;
    doc.set_attribute(icon, "style", &format!("color: {}", visual.color_hex))?;
    doc.set_attribute(icon, "data-icon", &visual.icon_id)?;
    doc.set_attribute(icon, "role", "img")?;
    doc.set_attribute(icon, "title", &visual.name)?;
    doc.set_attribute(icon, "aria-label", &visual.accessible_label())?;
    doc.append_child(wrapper, icon)?;

    let label = doc.create_element("span");
    doc.set_attribute(label, "class", SR_ONLY_CLASS)?;
    let text = doc.create_text(&visual.name);
    doc.append_child(label, text)?;
    doc.append_child(wrapper, label)?;

    Ok(wrapper)
}

/// Whether `id` is a wrapper this engine generated.
pub fn is_marked(doc: &Document, id: NodeId) -> bool {
    doc.attribute(id, MARKER_ATTR).is_some() || doc.has_class(id, WRAPPER_CLASS)
}

/// The nearest generated wrapper enclosing `id`, including `id` itself.
pub fn marked_ancestor(doc: &Document, id: NodeId) -> Option<NodeId> {
    doc.closest(id, |n| is_marked(doc, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prioicon_core::PriorityConfiguration;

    #[test]
    fn test_build_wrapper_markup() {
        let mut doc = Document::new();
        let config = PriorityConfiguration::defaults();
        let wrapper = build(&mut doc, config.get("Emergency").unwrap()).unwrap();

        assert_eq!(
            doc.outer_html(wrapper).unwrap(),
            concat!(
                r#"<span class="priority-icon-wrapper" data-priority-icon="Emergency">"#,
                r##"<span class="priority-icon priority-emergency" data-priority-color="#dc3545" "##,
                r#"style="color: #dc3545" data-icon="exclamation-triangle" role="img" "#,
                r#"title="Emergency" aria-label="Priority: Emergency"></span>"#,
                r#"<span class="priority-sr-only">Emergency</span></span>"#
            )
        );
        // built detached, so nothing is observable yet
        assert_eq!(doc.pending_records(), 0);
    }

    #[test]
    fn test_marked_ancestor_reaches_hidden_label() {
        let mut doc = Document::new();
        let config = PriorityConfiguration::defaults();
        let wrapper = build(&mut doc, config.get("Low").unwrap()).unwrap();
        let hidden_text = doc
            .descendants(wrapper)
            .find(|&n| doc.text(n) == Some("Low"))
            .unwrap();

        assert!(is_marked(&doc, wrapper));
        assert_eq!(marked_ancestor(&doc, hidden_text), Some(wrapper));
        assert_eq!(marked_ancestor(&doc, doc.root()), None);
    }
}
