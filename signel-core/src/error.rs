//! Error types for the reactive kernel.
//!
//! The error surface is deliberately small. Reads never fail, unchanged
//! writes are silent no-ops, and a panicking effect unwinds through the write
//! that triggered it rather than being converted into an `Error`.

use thiserror::Error;

/// Errors returned by the fallible constructors and typed accessors.
#[derive(Debug, Error)]
pub enum Error {
    /// A value handed to `wrap_value`/`wrap_serialize` was not a record.
    #[error("expected a JSON object to wrap, found {found}")]
    NotAnObject {
        /// The JSON kind that was found instead (`"array"`, `"number"`, ...).
        found: &'static str,
    },

    /// Serializing a value into a reactive record failed.
    #[error("failed to serialize value into a reactive object: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A typed read could not decode the stored field.
    #[error("field `{key}` could not be deserialized: {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A whole-record decode failed.
    #[error("reactive object could not be deserialized: {0}")]
    Decode(#[source] serde_json::Error),

    /// A context configuration document could not be parsed.
    #[error("invalid context configuration: {0}")]
    Config(#[source] serde_json::Error),

    /// A list index was outside the valid range for the operation.
    #[error("index {index} out of bounds for reactive list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
