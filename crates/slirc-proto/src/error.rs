//! Error types for the wire layer.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised while framing or decoding a byte stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The line decoded but does not follow the message grammar.
    #[error("invalid message: {0}")]
    Parse(#[from] MessageParseError),
}

/// Reasons a single line does not follow the message grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line is empty once the terminator is stripped.
    #[error("empty message")]
    EmptyMessage,

    /// No command token, or a token that is neither letters nor three digits.
    #[error("invalid command")]
    InvalidCommand,

    /// A `:` was present but no prefix followed it.
    #[error("invalid prefix")]
    InvalidPrefix,
}
