use scraper::Selector;

use crate::error::DomError;

/// Parse a CSS selector group, keeping the offending source in the error.
pub fn parse_selector(source: &str) -> Result<Selector, DomError> {
    Selector::parse(source).map_err(|e| DomError::InvalidSelector {
        selector: source.to_string(),
        reason: e.to_string(),
    })
}
