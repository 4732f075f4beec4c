//! Event source trait abstraction.
//!
//! An [`EventSource`] opens a long-lived server-sent event connection and
//! yields [`Frame`]s. Implementations own reconnection: transient drops are
//! retried internally and only a terminal failure reaches the stream as an
//! `Err`, after which the stream is finished.

use futures::Stream;
use std::pin::Pin;

use crate::error::StreamError;
use crate::sse::Frame;

/// Frames of one subscription, in arrival order.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, StreamError>> + Send>>;

/// Trait for opening server-sent event streams.
pub trait EventSource: Send + Sync {
    /// Prepare a stream for `url`.
    ///
    /// Construction errors (an unusable URL) are returned here, before any
    /// network activity. Connecting happens when the stream is first polled.
    fn open(&self, url: &str) -> Result<FrameStream, StreamError>;
}
