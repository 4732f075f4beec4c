//! Errors from resolving a message's content variant.

use thiserror::Error;

/// Failure to turn a message's raw `content` into a typed [`Content`].
///
/// [`Content`]: crate::models::Content
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentError {
    /// The message carries no `content` field at all.
    #[error("message has no content to resolve")]
    MissingContent,

    /// The content does not match the shape implied by the event kind.
    #[error("invalid {event} content: {message}")]
    InvalidPayload { event: String, message: String },
}

impl ContentError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ContentError::MissingContent => "E_CONTENT_MISSING",
            ContentError::InvalidPayload { .. } => "E_CONTENT_INVALID",
        }
    }
}
