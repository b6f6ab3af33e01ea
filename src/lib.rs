pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod runtime;
pub mod watcher;

pub use config::Config;
pub use debounce::{DebounceDelays, Debouncer};
pub use engine::{Engine, ScanPass, ScanReport, ScanRoots};
pub use error::EngineError;
pub use runtime::{Page, PageEvent, PageRuntime, RuntimeState, RuntimeStats};
pub use watcher::MutationWatcher;

pub use prioicon_core::{render_stylesheet, PriorityConfiguration, PriorityVisual};
pub use prioicon_dom::{Document, MutationRecord, NodeId, Selector};
