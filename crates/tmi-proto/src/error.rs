//! Error types for the TMI protocol crate.
//!
//! Codec failures and raw-line parse failures are kept apart so the session
//! layer can drop a malformed line without tearing down the transport.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Outgoing frame exceeded the maximum line length.
    #[error("message too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Actual message length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Failed to parse a raw protocol line.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The invalid line.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing a single protocol line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty (or only whitespace and terminators).
    #[error("empty message")]
    EmptyMessage,

    /// Line had a prefix but no command.
    #[error("missing command")]
    MissingCommand,

    /// Prefix marker was present with nothing after it.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),
}
