//! Common error type.

use thiserror::Error;

/// Errors raised while interpreting shared values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A string did not name any variant of the expected enumeration.
    #[error("unknown {kind} value: {value:?}")]
    UnknownValue {
        /// Which enumeration was being parsed (e.g. "role").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

impl Error {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Self::UnknownValue {
            kind,
            value: value.to_string(),
        }
    }
}

/// Result alias for common operations.
pub type Result<T> = std::result::Result<T, Error>;
