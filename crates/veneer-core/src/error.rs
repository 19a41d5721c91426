//! Error types shared across the veneer crates.

use thiserror::Error;

/// A size/position string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("invalid value format: {0:?} (expected \"<n>px\", \"<n>%\" or a number)")]
    InvalidFormat(String),
}

/// The content-measurement collaborator could not size a control.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeasureError {
    #[error("font {0:?} is not available")]
    MissingFont(String),

    #[error("text measurement failed: {0}")]
    Failed(String),
}
