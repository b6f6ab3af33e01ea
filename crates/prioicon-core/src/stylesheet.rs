use std::collections::HashSet;
use std::fmt::Write;

use crate::configuration::PriorityConfiguration;

/// Class of the wrapper element that replaces a priority label.
pub const WRAPPER_CLASS: &str = "priority-icon-wrapper";
/// Class of the rendered icon element.
pub const ICON_CLASS: &str = "priority-icon";
/// Class of the visually hidden, screen-reader-exposed label.
pub const SR_ONLY_CLASS: &str = "priority-sr-only";

/// Render the stylesheet the host injects next to the engine.
///
/// One color rule is emitted per visual identity, in definition order.
pub fn render_stylesheet(config: &PriorityConfiguration) -> String {
    let mut css = String::new();

    let _ = writeln!(
        css,
        ".{WRAPPER_CLASS} {{ display: inline-flex; align-items: center; }}"
    );
    let _ = writeln!(
        css,
        ".{ICON_CLASS} {{ display: inline-block; width: 0.75em; height: 0.75em; \
         border-radius: 50%; background-color: currentColor; }}"
    );
    let _ = writeln!(
        css,
        ".{SR_ONLY_CLASS} {{ position: absolute; width: 1px; height: 1px; padding: 0; \
         margin: -1px; overflow: hidden; clip: rect(0, 0, 0, 0); white-space: nowrap; border: 0; }}"
    );

    let mut seen = HashSet::new();
    for visual in config.visuals() {
        if !seen.insert(visual.css_class.as_str()) {
            continue;
        }
        let _ = writeln!(
            css,
            ".{ICON_CLASS}.{} {{ color: {}; }}",
            visual.css_class, visual.color_hex
        );
    }

    css
}
