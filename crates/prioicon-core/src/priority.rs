/// Visual identity rendered in place of one priority label.
///
/// Several names may share the same `css_class` and `color_hex`; they are
/// synonyms (e.g. "Emergency" and "Notfall") for one visual identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityVisual {
    /// Exact display string matched against page text (e.g. "Emergency")
    pub name: String,
    /// Color in `#rrggbb` form (e.g. "#dc3545")
    pub color_hex: String,
    /// Stable class token (e.g. "priority-emergency")
    pub css_class: String,
    /// Symbolic icon identifier, decorative only (e.g. "exclamation-triangle")
    pub icon_id: String,
}

impl PriorityVisual {
    pub fn new(
        name: impl Into<String>,
        color_hex: impl Into<String>,
        css_class: impl Into<String>,
        icon_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            color_hex: color_hex.into(),
            css_class: css_class.into(),
            icon_id: icon_id.into(),
        }
    }

    /// Accessible name announced for the icon.
    pub fn accessible_label(&self) -> String {
        format!("Priority: {}", self.name)
    }

    /// Whether two visuals share one visual identity.
    pub fn same_identity(&self, other: &PriorityVisual) -> bool {
        self.css_class == other.css_class && self.color_hex == other.color_hex
    }
}

pub const EMERGENCY_COLOR: &str = "#dc3545";
pub const HIGH_COLOR: &str = "#fd7e14";
pub const NORMAL_COLOR: &str = "#28a745";
pub const LOW_COLOR: &str = "#6c757d";

/// Built-in priority set: the four canonical priorities followed by the
/// German aliases the default deployment supports.
///
/// Canonical names come first; for each class the first entry is the one
/// whose override takes precedence over its aliases.
pub fn builtin_visuals() -> Vec<PriorityVisual> {
    vec![
        PriorityVisual::new(
            "Emergency",
            EMERGENCY_COLOR,
            "priority-emergency",
            "exclamation-triangle",
        ),
        PriorityVisual::new("High", HIGH_COLOR, "priority-high", "arrow-up"),
        PriorityVisual::new("Normal", NORMAL_COLOR, "priority-normal", "minus"),
        PriorityVisual::new("Low", LOW_COLOR, "priority-low", "arrow-down"),
        PriorityVisual::new(
            "Notfall",
            EMERGENCY_COLOR,
            "priority-emergency",
            "exclamation-triangle",
        ),
        PriorityVisual::new("Hoch", HIGH_COLOR, "priority-high", "arrow-up"),
        PriorityVisual::new("Niedrig", LOW_COLOR, "priority-low", "arrow-down"),
    ]
}
