//! Error types for the WCQ read path.
//!
//! All public APIs return `WcqResult<T>` — no panics in library code.

use thiserror::Error;

/// Unified error type for compilation, binding and row reconstruction.
#[derive(Debug, Error)]
pub enum WcqError {
    /// LIMIT is zero or negative
    #[error("LIMIT must be strictly positive, got {0}")]
    InvalidLimit(i64),

    /// Identifier does not resolve against the table layout
    #[error("undefined name '{name}' in {clause} clause")]
    UnknownField { name: String, clause: &'static str },

    /// The field or operator cannot be restricted this way
    #[error("unsupported restriction: {0}")]
    UnsupportedRestriction(String),

    /// A relation conflicts with an earlier relation on the same field
    #[error("'{field}' cannot be restricted by more than one relation {reason}")]
    ConflictingRestriction { field: String, reason: &'static str },

    /// A clustering field is restricted after a gap or a range
    #[error(
        "PRIMARY KEY part '{field}' cannot be restricted (preceding part '{previous}' is either not restricted or by a non-EQ relation)"
    )]
    NonPrefixRestriction { field: String, previous: String },

    /// Reversed order without an equality on the partition key
    #[error(
        "descending order is only supported if the partition key is restricted by an Equal or an IN"
    )]
    UnsupportedReversal,

    /// Metadata fields restricted without an equality on an indexed one
    #[error("no indexed columns present in by-columns clause with Equal operator")]
    NoIndexedEquality,

    /// Indexed predicates combined with a multi-value IN on the partition key
    #[error("select on indexed columns with an IN clause on the partition key is not supported")]
    IndexedInUnsupported,

    /// COUNT over anything but `*` or `1`
    #[error("only COUNT(*) and COUNT(1) are supported")]
    UnsupportedCount,

    /// Composite key bytes could not be decoded
    #[error("malformed composite key: {0}")]
    MalformedKey(String),

    /// Counter cell value is not a valid counter context
    #[error("malformed counter context: {0}")]
    MalformedCounter(String),

    /// Internal contract violation between this layer and its caller
    #[error("assertion failure: {0}")]
    AssertionFailure(String),

    /// Literal or bound value not valid for the field type
    #[error("invalid value for '{field}': {message}")]
    InvalidTerm { field: String, message: String },

    /// Bind marker index past the supplied variables
    #[error("bind marker {index} has no value ({provided} variables supplied)")]
    MissingVariable { index: usize, provided: usize },

    /// Table layout violates the invariants of its kind
    #[error("schema error: {0}")]
    Schema(String),

    /// Apache Arrow error (result export)
    #[error("arrow error: {source}")]
    Arrow {
        #[from]
        source: arrow::error::ArrowError,
    },

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for all WCQ operations.
pub type WcqResult<T> = Result<T, WcqError>;

impl From<serde_json::Error> for WcqError {
    fn from(err: serde_json::Error) -> Self {
        WcqError::Serialization(err.to_string())
    }
}

impl WcqError {
    /// Builds an `AssertionFailure` and records it for diagnosis.
    pub(crate) fn assertion(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(target: "wcq", %message, "read path contract violated");
        WcqError::AssertionFailure(message)
    }

    /// True for errors caused by the statement itself rather than stored data.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            WcqError::InvalidLimit(_)
                | WcqError::UnknownField { .. }
                | WcqError::UnsupportedRestriction(_)
                | WcqError::ConflictingRestriction { .. }
                | WcqError::NonPrefixRestriction { .. }
                | WcqError::UnsupportedReversal
                | WcqError::NoIndexedEquality
                | WcqError::IndexedInUnsupported
                | WcqError::UnsupportedCount
                | WcqError::InvalidTerm { .. }
                | WcqError::MissingVariable { .. }
        )
    }
}
