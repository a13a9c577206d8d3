use thiserror::Error;

use crate::id::{CacheRef, OperatorCode};

/// Canonical result for core and markup.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown operator: {0}")]
    UnknownOperator(OperatorCode),

    #[error("Malformed operator: {0}")]
    MalformedOperator(String),

    #[error("Malformed argument {index} of operator {code}: {reason}")]
    MalformedArgument {
        code: OperatorCode,
        index: usize,
        reason: String,
    },

    // A handle that the queried arena never minted. Always a bookkeeping
    // bug on the caller side.
    #[error("Dangling handle: {0}")]
    DanglingHandle(CacheRef),

    #[error("Unexpected node at {handle}: expected {expected}, found {found}")]
    UnexpectedNode {
        handle: CacheRef,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unknown option `{label}` in {scope}")]
    UnknownOption { scope: String, label: String },

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Hashing error: {0}")]
    Hash(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Parse(e.to_string())
    }
}
