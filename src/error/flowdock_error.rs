//! Unified error type for the Flowdock client.

use std::fmt;

use super::category::ErrorCategory;
use super::content::ContentError;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::request::RequestError;
use super::stream::StreamError;

/// Unified error type returned by every client operation.
#[derive(Debug)]
pub enum FlowdockError {
    /// The request could not be built. No I/O was attempted.
    Request(RequestError),

    /// Transport failure or non-2xx API response.
    Network(NetworkError),

    /// A live subscription ended abnormally.
    Stream(StreamError),

    /// A message's content could not be resolved.
    Content(ContentError),

    /// Wrapped error with additional context.
    WithContext {
        error: Box<FlowdockError>,
        context: ErrorContext,
    },
}

impl FlowdockError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            FlowdockError::Request(_) => ErrorCategory::Configuration,
            FlowdockError::Network(err) => match err {
                NetworkError::HttpStatus { status: 401 | 403, .. } => ErrorCategory::Auth,
                NetworkError::HttpStatus { status, .. } if *status >= 500 => {
                    ErrorCategory::Server
                }
                NetworkError::HttpStatus { .. } | NetworkError::InvalidResponse { .. } => {
                    ErrorCategory::Client
                }
                _ => ErrorCategory::Network,
            },
            FlowdockError::Stream(err) => match err {
                StreamError::ConnectionLost { .. } => ErrorCategory::Network,
                StreamError::Rejected { .. } => ErrorCategory::Server,
                StreamError::InvalidJson { .. } => ErrorCategory::Client,
                StreamError::InvalidUrl { .. } => ErrorCategory::Configuration,
            },
            FlowdockError::Content(_) => ErrorCategory::Client,
            FlowdockError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            FlowdockError::Request(_) => false,
            FlowdockError::Network(err) => err.is_retryable(),
            FlowdockError::Stream(err) => err.is_retryable(),
            FlowdockError::Content(_) => false,
            FlowdockError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            FlowdockError::Request(err) => format!("Invalid request: {}", err),
            FlowdockError::Network(err) => err.user_message(),
            FlowdockError::Stream(err) => err.user_message(),
            FlowdockError::Content(err) => format!("Unreadable message content: {}", err),
            FlowdockError::WithContext { error, context } => {
                format!("{}\n\nContext: {}", error.user_message(), context)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            FlowdockError::Request(err) => err.error_code(),
            FlowdockError::Network(err) => err.error_code(),
            FlowdockError::Stream(err) => err.error_code(),
            FlowdockError::Content(err) => err.error_code(),
            FlowdockError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// The HTTP status of an API error, looking through any context wrapper.
    pub fn status(&self) -> Option<u16> {
        match self.inner() {
            FlowdockError::Network(err) => err.status(),
            _ => None,
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        FlowdockError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            FlowdockError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &FlowdockError {
        match self {
            FlowdockError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for FlowdockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowdockError::Request(err) => write!(f, "{}", err),
            FlowdockError::Network(err) => write!(f, "{}", err),
            FlowdockError::Stream(err) => write!(f, "{}", err),
            FlowdockError::Content(err) => write!(f, "{}", err),
            FlowdockError::WithContext { error, context } => {
                write!(f, "{} ({})", error, context)
            }
        }
    }
}

impl std::error::Error for FlowdockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowdockError::Request(err) => Some(err),
            FlowdockError::Network(err) => Some(err),
            FlowdockError::Stream(err) => Some(err),
            FlowdockError::Content(err) => Some(err),
            FlowdockError::WithContext { error, .. } => error.source(),
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<RequestError> for FlowdockError {
    fn from(err: RequestError) -> Self {
        FlowdockError::Request(err)
    }
}

impl From<NetworkError> for FlowdockError {
    fn from(err: NetworkError) -> Self {
        FlowdockError::Network(err)
    }
}

impl From<StreamError> for FlowdockError {
    fn from(err: StreamError) -> Self {
        FlowdockError::Stream(err)
    }
}

impl From<ContentError> for FlowdockError {
    fn from(err: ContentError) -> Self {
        FlowdockError::Content(err)
    }
}

// ============================================================================
// From implementations for external error types
// ============================================================================

impl From<serde_json::Error> for FlowdockError {
    fn from(err: serde_json::Error) -> Self {
        FlowdockError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}

impl From<reqwest::Error> for FlowdockError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        FlowdockError::Network(super::network::classify_reqwest_error(&err, &url))
    }
}
