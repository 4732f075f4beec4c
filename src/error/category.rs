//! Error category classification.
//!
//! Categories give callers a coarse handle on an error without matching on
//! every variant: whether retrying makes sense, and who has to act.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection failures, timeouts, dropped streams.
    /// Generally transient and retryable.
    Network,

    /// The API rejected the credentials (HTTP 401/403).
    Auth,

    /// Backend errors (HTTP 5xx) or a server-side stream close.
    Server,

    /// Caller-side mistakes: rejected requests (4xx), payloads that do not
    /// match the expected shape, contract violations.
    Client,

    /// Invalid client configuration (base URL, token, path segments).
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns a human-readable description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connectivity issue",
            ErrorCategory::Auth => "Authentication problem",
            ErrorCategory::Server => "Server-side issue",
            ErrorCategory::Client => "Invalid request or payload",
            ErrorCategory::Configuration => "Configuration problem",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check your internet connection and try again",
            ErrorCategory::Auth => "Check that the API token is valid and has access to the flow",
            ErrorCategory::Server => "Flowdock may be experiencing issues. Please try again later",
            ErrorCategory::Client => "Check the request parameters and the received payload",
            ErrorCategory::Configuration => "Check the client configuration",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_categories() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Server.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::Client.is_retryable());
        assert!(!ErrorCategory::Configuration.is_retryable());
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(ErrorCategory::Network.to_string(), "network");
        assert_eq!(ErrorCategory::Configuration.to_string(), "configuration");
    }

    #[test]
    fn test_descriptions_not_empty() {
        for category in [
            ErrorCategory::Network,
            ErrorCategory::Auth,
            ErrorCategory::Server,
            ErrorCategory::Client,
            ErrorCategory::Configuration,
        ] {
            assert!(!category.description().is_empty());
            assert!(!category.recovery_hint().is_empty());
        }
    }
}
