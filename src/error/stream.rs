//! Errors that end a live message subscription.

use std::fmt;

/// Terminal conditions of a message stream.
///
/// A subscription reports at most one of these through its status slot.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The connection dropped and the event source gave up reconnecting.
    ConnectionLost {
        message: String,
    },

    /// The server refused the stream (non-2xx, bad redirect, invalid request).
    Rejected {
        message: String,
    },

    /// A frame carried data that is not a JSON-encoded message.
    InvalidJson {
        message: String,
        data: String,
    },

    /// The event source could not be constructed for the given URL.
    InvalidUrl {
        url: String,
        message: String,
    },
}

impl StreamError {
    /// Check if this error is likely transient and a new subscription may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StreamError::ConnectionLost { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionLost { .. } => {
                "Connection to the Flowdock stream was lost.".to_string()
            }
            StreamError::Rejected { .. } => {
                "Flowdock refused the stream. Check the token and flow name.".to_string()
            }
            StreamError::InvalidJson { .. } => {
                "Received an invalid message from the Flowdock stream.".to_string()
            }
            StreamError::InvalidUrl { url, .. } => {
                format!("The stream address '{}' is invalid.", url)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::Rejected { .. } => "E_STREAM_REJECTED",
            StreamError::InvalidJson { .. } => "E_STREAM_JSON",
            StreamError::InvalidUrl { .. } => "E_STREAM_URL",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
            StreamError::Rejected { message } => write!(f, "Stream rejected: {}", message),
            StreamError::InvalidJson { message, .. } => {
                write!(f, "Invalid JSON in stream frame: {}", message)
            }
            StreamError::InvalidUrl { url, message } => {
                write!(f, "Invalid stream URL '{}': {}", url, message)
            }
        }
    }
}

impl std::error::Error for StreamError {}
