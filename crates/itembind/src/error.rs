use std::result::Result as StdResult;

use thiserror::Error;

/// Result type for itembind operations.
pub type Result<T> = StdResult<T, Error>;

/// Parse error for event sequences.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
#[error("{message}")]
pub struct ParseError {
    /// Parse error message, optionally including location.
    message: String,
}

impl ParseError {
    /// Construct a parse error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Construct a parse error pointing at a byte offset within the sequence.
    pub fn with_offset(message: impl Into<String>, sequence: &str, offset: usize) -> Self {
        Self {
            message: format!("{} in \"{sequence}\" (offset {offset})", message.into()),
        }
    }
}

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("parse error: {0}")]
    /// Malformed event sequence.
    Parse(#[source] ParseError),

    #[error(
        "illegal event type \"{0}\": only key, button, motion, enter, leave and virtual events can be bound"
    )]
    /// The sequence names an event class that items cannot receive.
    IllegalEvent(String),

    #[error("unsupported: {0}")]
    /// Valid sequence syntax that the binding table does not implement.
    Unsupported(String),

    #[error("no binding for \"{sequence}\" on {tag}")]
    /// Lookup of a binding that was never registered.
    NoBinding {
        /// Tag the lookup was made against.
        tag: String,
        /// Sequence that was looked up.
        sequence: String,
    },

    #[error("usage: {0}")]
    /// Wrong arguments to a configuration call.
    Usage(String),

    #[error("command failed: {0}")]
    /// A bound command reported a failure.
    Command(String),

    /// The binding table was torn down.
    #[error("binding table has been destroyed")]
    Destroyed,
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}
