//! Error types for pairlist construction.

use thiserror::Error;

/// Main error type for conversion, allocation and list building.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("cannot convert {type_name} to a Lisp value: {reason}")]
    Conversion {
        type_name: &'static str,
        reason: String,
    },

    #[error("heap exhausted: {live} live objects, limit {limit}")]
    HeapExhausted { limit: usize, live: usize },

    #[error("argument list has {values} values but {names} names")]
    NamesLengthMismatch { values: usize, names: usize },
}

impl Error {
    pub(crate) fn conversion(type_name: &'static str, reason: impl Into<String>) -> Self {
        Error::Conversion {
            type_name,
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
