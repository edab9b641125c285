//! Error types for text splitting.

use crate::dom::NodeId;
use std::fmt;
use std::io;

/// Result type alias for text split operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for text split operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error while reading markup (demo binary, fixtures).
    Io(io::Error),
    /// No valid target elements were resolved for a session.
    Selection(String),
    /// Restructuring one target failed; other targets are unaffected.
    Processing { target: NodeId, source: Box<Error> },
    /// The configuration does not request any split level.
    Configuration(String),
    /// Invalid tree operation (stale node, hierarchy violation).
    Dom(String),
    /// Unsupported or malformed selector.
    Selector(String),
}

impl Error {
    pub(crate) fn dom(message: impl Into<String>) -> Self {
        Self::Dom(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Selection(s) => write!(f, "no valid elements found: {s}"),
            Self::Processing { target, source } => {
                write!(f, "error processing element {target}: {source}")
            }
            Self::Configuration(s) => write!(f, "invalid configuration: {s}"),
            Self::Dom(s) => write!(f, "invalid tree operation: {s}"),
            Self::Selector(s) => write!(f, "invalid selector: {s}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Processing { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
