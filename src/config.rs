//! Client configuration.

use std::fmt;
use std::time::Duration;

use crate::stream::FramePolicy;

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.flowdock.com/";

/// Default streaming API base URL.
pub const DEFAULT_STREAM_URL: &str = "https://stream.flowdock.com/";

/// Default timeout for REST calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default delay between stream reconnect attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(3);

/// Configuration for a [`Client`](crate::Client).
///
/// Nothing is read from the environment; every value is set explicitly.
///
/// # Example
///
/// ```ignore
/// use flowdock::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_token("personal-api-token")
///     .with_max_reconnect_attempts(Some(10));
/// ```
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the REST API
    pub api_url: String,
    /// Base URL of the streaming API
    pub stream_url: String,
    /// Personal API token, sent as HTTP Basic auth on REST calls
    pub token: Option<String>,
    pub user_agent: String,
    /// Timeout for REST calls. Streams are long-lived and have none.
    pub timeout: Duration,
    /// Fixed delay between stream reconnect attempts
    pub retry_interval: Duration,
    /// Consecutive failed reconnects before a stream gives up (`None`: never)
    pub max_reconnect_attempts: Option<u32>,
    /// What a stream does with a frame that is not a valid message
    pub frame_policy: FramePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            stream_url: DEFAULT_STREAM_URL.to_string(),
            token: None,
            user_agent: format!("flowdock-rs/{}", env!("CARGO_PKG_VERSION")),
            timeout: DEFAULT_TIMEOUT,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            max_reconnect_attempts: None,
            frame_policy: FramePolicy::default(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("stream_url", &self.stream_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("retry_interval", &self.retry_interval)
            .field("max_reconnect_attempts", &self.max_reconnect_attempts)
            .field("frame_policy", &self.frame_policy)
            .finish()
    }
}

impl ClientConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_stream_url(mut self, url: impl Into<String>) -> Self {
        self.stream_url = url.into();
        self
    }

    /// Set the personal API token used for REST calls.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_frame_policy(mut self, policy: FramePolicy) -> Self {
        self.frame_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "https://api.flowdock.com/");
        assert_eq!(config.stream_url, "https://stream.flowdock.com/");
        assert_eq!(config.token, None);
        assert!(config.user_agent.starts_with("flowdock-rs/"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry_interval, Duration::from_secs(3));
        assert_eq!(config.max_reconnect_attempts, None);
        assert_eq!(config.frame_policy, FramePolicy::Terminate);
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::new()
            .with_api_url("http://localhost:8080")
            .with_stream_url("http://localhost:8081")
            .with_token("abc")
            .with_user_agent("bot/1.0")
            .with_timeout(Duration::from_secs(5))
            .with_retry_interval(Duration::from_millis(100))
            .with_max_reconnect_attempts(Some(3))
            .with_frame_policy(FramePolicy::Skip);

        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.stream_url, "http://localhost:8081");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.user_agent, "bot/1.0");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry_interval, Duration::from_millis(100));
        assert_eq!(config.max_reconnect_attempts, Some(3));
        assert_eq!(config.frame_policy, FramePolicy::Skip);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::new().with_token("s3cret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("***"));
    }
}
