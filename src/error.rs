//! Error taxonomy for the configuration core.
//!
//! Every variant is recoverable at the call site: a rejected write or load never
//! leaves the registry partially mutated.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Index outside a collection's bounds
    #[error("{collection} index {index} out of bounds (len {len})")]
    Index {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    /// Field value outside its declared range
    #[error("{field} value {value} out of range ({min}-{max})")]
    Range {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Enumerated field given a value it cannot take
    #[error("{field} cannot be '{value}'")]
    InvalidValue { field: &'static str, value: String },

    /// Persistence document missing or malformed field
    #[error("invalid document: {collection}[{index}].{field}: {reason}")]
    Validation {
        collection: String,
        index: usize,
        field: String,
        reason: String,
    },

    /// Device unavailable or I/O failure while talking to it
    #[error("MIDI transport: {0}")]
    Transport(String),

    /// Tool configuration rejected
    #[error("configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn index(collection: &'static str, index: usize, len: usize) -> Self {
        Error::Index {
            collection,
            index,
            len,
        }
    }

    pub(crate) fn validation(
        collection: &str,
        index: usize,
        field: &str,
        reason: impl Into<String>,
    ) -> Self {
        Error::Validation {
            collection: collection.to_string(),
            index,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Document-level failure not tied to a single entity
    pub(crate) fn document(collection: &str, reason: impl Into<String>) -> Self {
        Error::Validation {
            collection: collection.to_string(),
            index: 0,
            field: "*".to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
