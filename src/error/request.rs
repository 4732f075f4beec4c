//! Errors raised while building a request, before any I/O happens.

use thiserror::Error;

/// A request could not be constructed from the given parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// A configured base URL does not parse.
    #[error("invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    /// A path could not be joined onto the base URL.
    #[error("invalid request path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// A required path segment (organization, flow, token) is empty.
    #[error("{name} must not be empty")]
    EmptySegment { name: &'static str },

    /// The API token cannot be carried in an HTTP header.
    #[error("API token contains characters not allowed in a header")]
    InvalidToken,
}

impl RequestError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBaseUrl { .. } => "E_REQ_BASE_URL",
            RequestError::InvalidPath { .. } => "E_REQ_PATH",
            RequestError::EmptySegment { .. } => "E_REQ_SEGMENT",
            RequestError::InvalidToken => "E_REQ_TOKEN",
        }
    }
}
