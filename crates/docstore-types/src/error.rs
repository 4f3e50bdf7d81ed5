use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid document id: {0:?}")]
    InvalidId(String),

    #[error("invalid filename {name:?}: {reason}")]
    InvalidFilename { name: String, reason: &'static str },
}
