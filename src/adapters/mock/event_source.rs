//! Mock event source for testing.
//!
//! Frames and errors are injected through the mock and replayed, in order, by
//! the stream returned from [`EventSource::open`]. The stream stays pending
//! until [`MockEventSource::finish`] is called, like a quiet live connection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::error::StreamError;
use crate::sse::Frame;
use crate::traits::{EventSource, FrameStream};

type Item = Result<Frame, StreamError>;

/// Mock event source with frame injection.
///
/// # Example
///
/// ```ignore
/// use flowdock::adapters::mock::MockEventSource;
///
/// let source = MockEventSource::new();
/// source.push_data(r#"{"event":"message","content":"hi"}"#);
/// source.finish();
///
/// let stream = client_with(source.clone()).messages().stream("token", "acme", "main")?;
/// ```
#[derive(Debug, Clone)]
pub struct MockEventSource {
    sender: Arc<Mutex<Option<mpsc::UnboundedSender<Item>>>>,
    receiver: Arc<Mutex<Option<mpsc::UnboundedReceiver<Item>>>>,
    open_error: Arc<Mutex<Option<StreamError>>>,
    opened_urls: Arc<Mutex<Vec<String>>>,
    released: Arc<AtomicBool>,
}

/// Marks the mock released when the opened stream is dropped.
struct ReleaseGuard(Arc<AtomicBool>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl MockEventSource {
    /// Create a mock with no frames queued.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sender: Arc::new(Mutex::new(Some(tx))),
            receiver: Arc::new(Mutex::new(Some(rx))),
            open_error: Arc::new(Mutex::new(None)),
            opened_urls: Arc::new(Mutex::new(Vec::new())),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Queue a frame.
    pub fn push_frame(&self, frame: Frame) {
        self.push(Ok(frame));
    }

    /// Queue a frame carrying `data`.
    pub fn push_data(&self, data: impl Into<String>) {
        self.push_frame(Frame::data(data));
    }

    /// Queue a terminal read error.
    pub fn push_error(&self, error: StreamError) {
        self.push(Err(error));
    }

    /// End the stream after the queued items.
    pub fn finish(&self) {
        self.sender.lock().unwrap().take();
    }

    /// Make the next `open` fail with `error`.
    pub fn fail_open(&self, error: StreamError) {
        *self.open_error.lock().unwrap() = Some(error);
    }

    /// URLs passed to `open`, in call order.
    pub fn opened_urls(&self) -> Vec<String> {
        self.opened_urls.lock().unwrap().clone()
    }

    /// True once the stream handed out by `open` has been dropped.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    fn push(&self, item: Item) {
        if let Some(tx) = self.sender.lock().unwrap().as_ref() {
            let _ = tx.send(item);
        }
    }
}

impl Default for MockEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for MockEventSource {
    fn open(&self, url: &str) -> Result<FrameStream, StreamError> {
        self.opened_urls.lock().unwrap().push(url.to_string());

        if let Some(error) = self.open_error.lock().unwrap().take() {
            return Err(error);
        }

        let receiver = self
            .receiver
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| StreamError::Rejected {
                message: "mock event source already opened".to_string(),
            })?;

        let guard = ReleaseGuard(self.released.clone());
        let stream = futures::stream::unfold((receiver, guard), |(mut rx, guard)| async move {
            rx.recv().await.map(|item| (item, (rx, guard)))
        });
        Ok(Box::pin(stream))
    }
}
