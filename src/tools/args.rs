//! Tool argument values.
//!
//! MCP clients may send any JSON value for a parameter. Arguments are
//! accepted as an [`ArgValue`] and narrowed to a string explicitly, so a
//! wrong type is reported with the tool's own message instead of a generic
//! deserialization failure.

use crate::error::{DbError, DbResult};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// A dynamically typed argument value. `null` is represented by `None` at
/// the field level.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<JsonValue>),
    Object(serde_json::Map<String, JsonValue>),
}

impl ArgValue {
    /// JSON type name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) | Self::Float(_) => "number",
            Self::Text(_) => "string",
            Self::List(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

/// Extract a required string argument.
///
/// Missing or non-string values fail with `InvalidArgument(message)`.
pub fn require_string(value: Option<ArgValue>, message: &str) -> DbResult<String> {
    match value {
        Some(ArgValue::Text(s)) => Ok(s),
        Some(other) => {
            tracing::debug!(kind = other.kind(), "Rejected non-string argument");
            Err(DbError::invalid_argument(message))
        }
        None => Err(DbError::invalid_argument(message)),
    }
}

/// Extract an optional string argument. Absent and `null` both yield `None`.
pub fn optional_string(value: Option<ArgValue>, message: &str) -> DbResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(ArgValue::Text(s)) => Ok(Some(s)),
        Some(other) => {
            tracing::debug!(kind = other.kind(), "Rejected non-string argument");
            Err(DbError::invalid_argument(message))
        }
    }
}
