//! Prioicon DOM - A scraper document that records its own mutations.
//!
//! Documents are parsed and serialized by `scraper`, edited through
//! [`Document`], and every child-list change under the document root is
//! queued as a [`MutationRecord`] until the owner drains it, which is how
//! the engine observes the page.

pub mod document;
pub mod error;
pub mod mutation;
pub mod parse;
pub mod selector;

// Re-exports for convenience
pub use document::Document;
pub use ego_tree::NodeId;
pub use error::DomError;
pub use mutation::MutationRecord;
pub use scraper::{ElementRef, Html, Node, Selector};
pub use selector::parse_selector;
