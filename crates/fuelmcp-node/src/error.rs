//! Structured error handling for node execution.

use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while executing the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Input validation failed.
    InvalidInput,
    /// The correction service rejected the request.
    Upstream,
    /// The correction service replied with an unparseable body.
    Serialization,
    /// Network-related error occurred.
    NetworkError,
    /// Timeout occurred.
    Timeout,
    /// The host cancelled the invocation.
    Cancelled,
}

impl ErrorKind {
    /// Check if this error kind is typically retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError | Self::Timeout)
    }
}

/// Error type for node execution.
///
/// Every variant is surfaced to the host as a failed invocation. The node
/// never retries on its own; [`Error::is_retryable`] is advisory only.
#[derive(Debug, Error)]
pub enum Error {
    /// The invocation is missing a mandatory input or carries an invalid one.
    #[error("validation error: {message}")]
    Validation { message: String },
    /// The correction service responded with a non-2xx status code.
    #[error("correction service returned {status}")]
    UpstreamStatus { status: u16 },
    /// The correction service responded 2xx but the body is not valid JSON.
    #[error("invalid response body: {0}")]
    MalformedBody(#[source] serde_json::Error),
    /// The correction service could not be reached.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The host cancelled the invocation while it was in flight.
    #[error("invocation cancelled")]
    Cancelled,
}

impl Error {
    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::InvalidInput,
            Self::UpstreamStatus { .. } => ErrorKind::Upstream,
            Self::MalformedBody(_) => ErrorKind::Serialization,
            Self::Transport(e) if e.is_timeout() => ErrorKind::Timeout,
            Self::Transport(_) => ErrorKind::NetworkError,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Returns the upstream status code, if the service replied with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if a host-level retry is likely to succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UpstreamStatus { status } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => self.kind().is_retryable(),
        }
    }
}
