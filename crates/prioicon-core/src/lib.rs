//! Prioicon Core - Priority visuals, configuration resolution, and validation.
//!
//! This crate contains the leaf logic of the priority icon system: the
//! built-in priority set, the merge of runtime overrides onto it, and the
//! stylesheet derived from the result. It has no dependencies on other
//! Prioicon crates.

pub mod configuration;
pub mod error;
pub mod priority;
pub mod stylesheet;
pub mod validation;

// Re-exports for convenience
pub use configuration::PriorityConfiguration;
pub use error::{ConfigError, ValidationError};
pub use priority::PriorityVisual;
pub use stylesheet::{render_stylesheet, ICON_CLASS, SR_ONLY_CLASS, WRAPPER_CLASS};
pub use validation::Validator;
