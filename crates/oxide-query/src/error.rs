//! Error types for query construction and rendering.

use thiserror::Error;

/// Errors raised while normalizing or rendering a query.
///
/// All of these are raised synchronously, before any SQL reaches the
/// database. Execution failures come from the [`Connection`] collaborator
/// and are carried unmodified in [`QueryError::Execution`].
///
/// [`Connection`]: crate::connection::Connection
#[derive(Debug, Error)]
pub enum QueryError {
    /// An operator-array condition has the wrong shape.
    #[error("malformed condition: {reason}: {value}")]
    MalformedCondition {
        /// What is wrong with the condition.
        reason: String,
        /// The offending value, rendered as JSON.
        value: String,
    },

    /// A clause input was given a value of an unsupported type.
    #[error("unsupported input type for {clause}: {found}")]
    UnsupportedInputType {
        /// The clause being configured (`select`, `orderBy`, ...).
        clause: &'static str,
        /// The kind of value that was supplied.
        found: &'static str,
    },

    /// Connection configuration could not be parsed.
    #[error("invalid connection config: {0}")]
    Config(#[from] serde_json::Error),

    /// The database collaborator failed to execute a statement.
    #[error("execution failed: {0}")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl QueryError {
    /// Creates a malformed-condition error naming the offending value.
    pub fn malformed(reason: impl Into<String>, value: &crate::Value) -> Self {
        Self::MalformedCondition {
            reason: reason.into(),
            value: value.to_string(),
        }
    }
}

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
