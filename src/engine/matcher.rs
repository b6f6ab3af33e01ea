use std::sync::Arc;

use prioicon_core::{PriorityConfiguration, PriorityVisual};

/// Exact-match filter for text node content.
///
/// A cheap length check against the shortest and longest configured name
/// runs before the exact, case-sensitive lookup.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    config: Arc<PriorityConfiguration>,
    min_len: usize,
    max_len: usize,
}

impl TextMatcher {
    pub fn new(config: Arc<PriorityConfiguration>) -> Self {
        let (min_len, max_len) = config.name_length_bounds();
        Self {
            config,
            min_len,
            max_len,
        }
    }

    pub fn config(&self) -> &PriorityConfiguration {
        &self.config
    }

    /// The visual whose name equals the trimmed `text`, if any.
    pub fn accept(&self, text: &str) -> Option<&PriorityVisual> {
        let trimmed = text.trim();
        // counting stops one past the upper bound, so long texts cost O(max_len)
        let len = trimmed.chars().take(self.max_len + 1).count();
        if len < self.min_len || len > self.max_len {
            return None;
        }
        self.config.get(trimmed)
    }
}
