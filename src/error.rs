//! Error types for the thinker crate.
//!
//! One error enum covers the session's fault taxonomy: startup faults are
//! fatal and reported before any terminal-mode change, template and
//! generation faults are recoverable within the chat loop.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// The main error type for the thinker crate.
#[derive(Clone, Debug)]
pub enum Error {
    /// The model server was unreachable or not ready before the session began.
    Startup {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The conversation history could not be formatted into a prompt.
    Format {
        /// Human-readable error message.
        message: String,
    },

    /// The fragment source failed mid-stream.
    Stream {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },
}

impl Error {
    /// Creates a new startup error.
    pub fn startup(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Startup {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new chat template error.
    pub fn format(message: impl Into<String>) -> Self {
        Error::Format {
            message: message.into(),
        }
    }

    /// Creates a new streaming error.
    pub fn stream(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Stream {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Returns true if this error is fatal before the session starts.
    pub fn is_startup(&self) -> bool {
        matches!(self, Error::Startup { .. })
    }

    /// Returns true if this error is a chat template failure.
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format { .. })
    }

    /// Returns true if this error is a streaming failure.
    pub fn is_stream(&self) -> bool {
        matches!(self, Error::Stream { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Startup { message, .. } => {
                write!(f, "Startup error: {message}")
            }
            Error::Format { message } => {
                write!(f, "Chat template error: {message}")
            }
            Error::Stream { message, .. } => {
                write!(f, "Generation error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Startup { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Stream { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::Format { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

/// A specialized Result type for thinker operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = Error::format("no chat template configured");
        assert_eq!(
            err.to_string(),
            "Chat template error: no chat template configured"
        );
    }

    #[test]
    fn predicates_match_variants() {
        assert!(Error::startup("unreachable", None).is_startup());
        assert!(Error::format("missing template").is_format());
        assert!(Error::stream("connection reset", None).is_stream());
        assert!(!Error::stream("connection reset", None).is_format());
    }

    #[test]
    fn io_errors_convert_and_carry_source() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io { .. }));
        assert!(error::Error::source(&err).is_some());
    }
}
