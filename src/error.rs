use thiserror::Error;

use prioicon_dom::DomError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
