use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid color {0:?}: expected #rrggbb")]
    InvalidColor(String),

    #[error("Invalid css class: {0}")]
    InvalidCssClass(String),

    #[error("Invalid icon id {0:?}: expected lowercase words joined by hyphens")]
    InvalidIconId(String),

    #[error("Invalid priority name: {0}")]
    InvalidName(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Duplicate priority name: {0}")]
    DuplicateName(String),

    #[error("Priority configuration is empty")]
    Empty,
}
