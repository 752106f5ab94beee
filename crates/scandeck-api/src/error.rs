use thiserror::Error;

/// Top-level error type for the `scandeck-api` crate.
///
/// Mirrors the service's error taxonomy: a non-2xx response carrying a
/// structured `{message}` body becomes [`Error::Server`] and is shown to
/// the user verbatim; everything else is a transport or decoding failure
/// that the UI collapses into a generic network-error notification.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Structured error reported by the scanner service.
    #[error("Scanner service error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// The message the UI should surface: the server's own wording for
    /// structured failures, `None` for transport-level problems.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => Some(message),
            _ => None,
        }
    }
}
