//! Error types for the SQL MCP Server.
//!
//! Every failure a tool call can produce is a [`DbError`]. Messages shown to
//! the MCP client are deliberately generic: backend error text is carried in
//! a `detail` field that is logged server-side but never rendered by
//! `Display`.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Bad startup configuration (unparsable port, unknown server mode, ...).
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Pool could not be opened or the liveness probe failed.
    #[error("Connection failed: {message}")]
    Connection { message: String, detail: String },

    /// Tool argument missing or of the wrong type.
    #[error("{message}")]
    InvalidArgument { message: String },

    /// Statement did not match the category the tool accepts.
    #[error("{message}")]
    DisallowedStatement { message: String },

    /// The backend rejected or failed the statement.
    #[error("{message}")]
    ExecutionFailed { message: String, detail: String },

    /// A result cell or row could not be decoded.
    #[error("{message}")]
    Decode { message: String, detail: String },

    #[error("Timeout: {operation} exceeded {limit:?}")]
    Timeout { operation: String, limit: Duration },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a connection error; `detail` stays out of the display text.
    pub fn connection(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a disallowed statement error.
    pub fn disallowed(message: impl Into<String>) -> Self {
        Self::DisallowedStatement {
            message: message.into(),
        }
    }

    /// Create an execution error with backend detail.
    pub fn execution_failed(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// Create a decode error with the generic "result parsing failed" message.
    pub fn decode(detail: impl Into<String>) -> Self {
        Self::Decode {
            message: "result parsing failed".to_string(),
            detail: detail.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, limit: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            limit,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Backend detail attached to this error, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Connection { detail, .. }
            | Self::ExecutionFailed { detail, .. }
            | Self::Decode { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Replace the caller-visible message of an execution or decode
    /// failure with the tool's own wording, keeping the backend detail.
    pub fn relabel(self, execution: &str, decode: &str) -> Self {
        match self {
            Self::ExecutionFailed { detail, .. } => Self::ExecutionFailed {
                message: execution.to_string(),
                detail,
            },
            Self::Decode { detail, .. } => Self::Decode {
                message: decode.to_string(),
                detail,
            },
            other => other,
        }
    }

    /// Demote a lost-connection error raised while serving a tool call to
    /// an execution failure. `Connection` is reserved for startup.
    pub fn into_execution_failure(self) -> Self {
        match self {
            Self::Connection { message, detail } => Self::ExecutionFailed {
                message: "query execution failed".to_string(),
                detail: format!("{}: {}", message, detail),
            },
            other => other,
        }
    }

    /// Whether this error was caused by the caller's input rather than the server.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::DisallowedStatement { .. }
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// Statement-level failures become `ExecutionFailed` with the generic
/// "query execution failed" message; handlers refine the message with
/// [`DbError::relabel`].
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => {
                DbError::config(format!("invalid connection options: {}", msg))
            }
            sqlx::Error::PoolTimedOut => DbError::execution_failed(
                "query execution failed",
                "timed out waiting for a pooled connection",
            ),
            sqlx::Error::PoolClosed => {
                DbError::connection("connection pool is closed", "pool closed")
            }
            sqlx::Error::Io(io_err) => {
                DbError::connection("database unreachable", format!("I/O error: {}", io_err))
            }
            sqlx::Error::Tls(tls_err) => {
                DbError::connection("database unreachable", format!("TLS error: {}", tls_err))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => DbError::decode(format!(
                "column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::decode(format!("failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::decode(format!("decode error: {}", source)),
            sqlx::Error::Database(db_err) => {
                let detail = match db_err.code() {
                    Some(code) => format!("{} (SQLSTATE: {})", db_err.message(), code),
                    None => db_err.message().to_string(),
                };
                DbError::execution_failed("query execution failed", detail)
            }
            other => DbError::execution_failed("query execution failed", other.to_string()),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Convert DbError to MCP ErrorData.
///
/// Caller mistakes map to `invalid_params`; everything else is an
/// `internal_error`. No backend detail is forwarded.
impl From<DbError> for rmcp::ErrorData {
    fn from(err: DbError) -> Self {
        if err.is_caller_error() {
            rmcp::ErrorData::invalid_params(err.to_string(), None)
        } else {
            rmcp::ErrorData::internal_error(err.to_string(), None)
        }
    }
}
