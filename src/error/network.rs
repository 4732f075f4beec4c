//! Transport and API error types for REST calls.

use std::fmt;

/// Errors raised while performing a REST request against the Flowdock API.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Connection to the server failed.
    ConnectionFailed {
        url: String,
        message: String,
    },

    /// Request timed out.
    Timeout {
        operation: String,
    },

    /// The API answered with a non-2xx status. `body` is the raw response body.
    HttpStatus {
        status: u16,
        body: String,
    },

    /// A 2xx response whose body could not be decoded into the expected shape.
    InvalidResponse {
        message: String,
    },

    /// Generic transport error.
    Other {
        message: String,
    },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::InvalidResponse { .. } => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// The HTTP status if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to connect to Flowdock. Please check your internet connection.".to_string()
            }
            NetworkError::Timeout { operation } => {
                format!("The {} request timed out.", operation)
            }
            NetworkError::HttpStatus { status, .. } => match *status {
                400 => "The request was rejected as invalid.".to_string(),
                401 => "Authentication required. Check your API token.".to_string(),
                403 => "Access denied to this flow or message.".to_string(),
                404 => "The flow or message was not found.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => "Flowdock is experiencing issues. Please try again later.".to_string(),
                _ => format!("Flowdock returned an error (HTTP {}).", status),
            },
            NetworkError::InvalidResponse { .. } => {
                "Received an invalid response from Flowdock.".to_string()
            }
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { operation } => write!(f, "{} timed out", operation),
            NetworkError::HttpStatus { status, body } => {
                write!(f, "HTTP {} error: {}", status, body)
            }
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Classify a reqwest error into a NetworkError.
pub fn classify_reqwest_error(err: &reqwest::Error, url: &str) -> NetworkError {
    if err.is_connect() {
        NetworkError::ConnectionFailed {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else if err.is_timeout() {
        NetworkError::Timeout {
            operation: "HTTP request".to_string(),
        }
    } else if err.is_decode() {
        NetworkError::InvalidResponse {
            message: format!("Failed to decode response: {}", err),
        }
    } else if let Some(status) = err.status() {
        NetworkError::HttpStatus {
            status: status.as_u16(),
            body: err.to_string(),
        }
    } else {
        NetworkError::Other {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_classify_refused_connection() {
        let err = reqwest::get("http://127.0.0.1:1/").await.unwrap_err();
        let classified = classify_reqwest_error(&err, "http://127.0.0.1:1/");

        assert!(matches!(
            classified,
            NetworkError::ConnectionFailed { ref url, .. } if url == "http://127.0.0.1:1/"
        ));
        assert!(classified.is_retryable());
    }

    #[test]
    fn test_retryable_status_codes() {
        let server = NetworkError::HttpStatus {
            status: 503,
            body: String::new(),
        };
        assert!(server.is_retryable());

        let rate = NetworkError::HttpStatus {
            status: 429,
            body: String::new(),
        };
        assert!(rate.is_retryable());

        let not_found = NetworkError::HttpStatus {
            status: 404,
            body: "{\"message\":\"not found\"}".to_string(),
        };
        assert!(!not_found.is_retryable());
        assert_eq!(not_found.status(), Some(404));
    }

    #[test]
    fn test_display_carries_status_and_body() {
        let err = NetworkError::HttpStatus {
            status: 422,
            body: "content is missing".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 422 error: content is missing");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            NetworkError::Timeout {
                operation: "list".to_string()
            }
            .error_code(),
            "E_NET_TIMEOUT"
        );
        assert_eq!(
            NetworkError::InvalidResponse {
                message: "bad".to_string()
            }
            .error_code(),
            "E_NET_INVALID"
        );
    }

    #[test]
    fn test_user_message_for_auth_failure() {
        let err = NetworkError::HttpStatus {
            status: 401,
            body: String::new(),
        };
        assert!(err.user_message().contains("API token"));
    }
}
