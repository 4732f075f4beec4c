//! Event source adapter backed by `eventsource-client`.
//!
//! The underlying client reconnects on its own. This adapter decides which of
//! its errors are worth another attempt and surfaces the rest as the terminal
//! error of the stream.

use std::time::Duration;

use eventsource_client as es;
use eventsource_client::Client as _;
use futures_util::StreamExt;
use tracing::{debug, warn};

pub use crate::config::DEFAULT_RETRY_INTERVAL;
use crate::endpoint::redact_access_token;
use crate::error::StreamError;
use crate::sse::Frame;
use crate::traits::{EventSource, FrameStream};

/// Production [`EventSource`] using `eventsource-client`.
#[derive(Debug, Clone)]
pub struct EventSourceClient {
    retry_interval: Duration,
    max_reconnect_attempts: Option<u32>,
    user_agent: Option<String>,
}

impl EventSourceClient {
    /// Create an event source retrying every 3 seconds without limit.
    pub fn new() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            max_reconnect_attempts: None,
            user_agent: None,
        }
    }

    /// Set the fixed delay between reconnect attempts.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Give up after this many consecutive failed attempts.
    pub fn with_max_reconnect_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    fn reconnect_options(&self) -> es::ReconnectOptions {
        es::ReconnectOptions::reconnect(true)
            .retry_initial(true)
            .delay(self.retry_interval)
            .backoff_factor(1)
            .delay_max(self.retry_interval)
            .build()
    }
}

impl Default for EventSourceClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors after which reconnecting cannot help.
fn is_terminal(err: &es::Error) -> bool {
    matches!(
        err,
        es::Error::UnexpectedResponse(..)
            | es::Error::InvalidParameter(..)
            | es::Error::MalformedLocationHeader(..)
            | es::Error::MaxRedirectLimitReached(..)
    )
}

struct ReadState {
    inner: es::BoxStream<es::Result<es::SSE>>,
    failures: u32,
    max_failures: Option<u32>,
    finished: bool,
    url: String,
}

async fn next_frame(mut state: ReadState) -> Option<(Result<Frame, StreamError>, ReadState)> {
    if state.finished {
        return None;
    }

    loop {
        match state.inner.next().await {
            Some(Ok(es::SSE::Event(event))) => {
                state.failures = 0;
                let frame = Frame {
                    event: event.event_type,
                    data: event.data,
                    id: event.id,
                };
                return Some((Ok(frame), state));
            }
            Some(Ok(_)) => {
                // comments and connection notices carry no data
                state.failures = 0;
            }
            Some(Err(err)) if is_terminal(&err) => {
                state.finished = true;
                let message = err.to_string();
                warn!(url = %state.url, error = %message, "Event stream rejected");
                return Some((Err(StreamError::Rejected { message }), state));
            }
            Some(Err(err)) => {
                state.failures += 1;
                if let Some(max) = state.max_failures {
                    if state.failures > max {
                        state.finished = true;
                        let message = format!(
                            "gave up after {} reconnect attempts: {}",
                            max, err
                        );
                        warn!(url = %state.url, error = %message, "Event stream lost");
                        return Some((Err(StreamError::ConnectionLost { message }), state));
                    }
                }
                debug!(
                    url = %state.url,
                    attempt = state.failures,
                    error = %err,
                    "Event stream dropped, reconnecting"
                );
            }
            None => return None,
        }
    }
}

impl EventSource for EventSourceClient {
    fn open(&self, url: &str) -> Result<FrameStream, StreamError> {
        let redacted = redact_access_token(url);
        let invalid = |e: es::Error| StreamError::InvalidUrl {
            url: redacted.clone(),
            message: e.to_string(),
        };

        let mut builder = es::ClientBuilder::for_url(url).map_err(invalid)?;
        builder = builder.header("Accept", "text/event-stream").map_err(invalid)?;
        if let Some(ref user_agent) = self.user_agent {
            builder = builder.header("User-Agent", user_agent).map_err(invalid)?;
        }
        let client = builder.reconnect(self.reconnect_options()).build();

        let state = ReadState {
            inner: client.stream(),
            failures: 0,
            max_failures: self.max_reconnect_attempts,
            finished: false,
            url: redacted,
        };

        Ok(Box::pin(futures::stream::unfold(state, next_frame)))
    }
}
