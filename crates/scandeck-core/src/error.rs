// ── Core error types ──
//
// User-facing errors from scandeck-core. The `From<scandeck_api::Error>`
// impl translates transport-layer failures into the two branches the UI
// distinguishes: a server-reported message (shown verbatim) and a generic
// network failure.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The service rejected the request with a structured message.
    /// The message reaches the user word-for-word.
    #[error("{message}")]
    Rejected { message: String },

    /// Transport-level failure: connection refused, timeout, or a body
    /// that did not decode. Collapsed to a generic network error in the UI.
    #[error("Network error: {reason}")]
    Network { reason: String },
}

impl From<scandeck_api::Error> for CoreError {
    fn from(err: scandeck_api::Error) -> Self {
        match err {
            scandeck_api::Error::Server { message, .. } => Self::Rejected { message },
            other => Self::Network {
                reason: other.to_string(),
            },
        }
    }
}

impl CoreError {
    /// The text a toast should carry for this failure.
    pub fn toast_message(&self) -> String {
        match self {
            Self::Rejected { message } => message.clone(),
            Self::Network { .. } => "Network error".to_owned(),
        }
    }
}
