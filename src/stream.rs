//! Live message stream consumer.
//!
//! [`MessageStream::spawn`] starts one background task per subscription. The
//! task pulls frames from an [`EventSource`](crate::traits::EventSource),
//! decodes each into a [`Message`] and hands it to the caller over a channel
//! with room for a single message, so a slow consumer holds the task back.
//!
//! The task ends when the source ends, on a read error, on a malformed frame
//! (unless [`FramePolicy::Skip`] is set) or when the caller closes the handle.
//! How it ended is published as a [`StreamStatus`].

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use futures_util::StreamExt;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::StreamError;
use crate::models::Message;
use crate::sse::decode_frame;
use crate::traits::FrameStream;

/// What to do with a frame whose data is not a valid message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FramePolicy {
    /// End the subscription with [`StreamStatus::Failed`]
    #[default]
    Terminate,
    /// Log a warning and keep reading
    Skip,
}

/// Lifecycle of a subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamStatus {
    /// The task is reading frames
    Open,
    /// The source ended without an error
    Ended,
    /// The source failed, or a frame could not be decoded
    Failed(StreamError),
    /// The caller closed or dropped the handle
    Cancelled,
}

impl StreamStatus {
    /// True once the task has stopped for good.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamStatus::Open)
    }

    /// The terminal error, if the stream failed.
    pub fn error(&self) -> Option<&StreamError> {
        match self {
            StreamStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Handle to a live subscription.
///
/// Messages arrive in frame order through [`recv`](Self::recv) or the
/// [`Stream`] impl. Once the task stops, buffered messages are still
/// delivered and then `recv` returns `None`. Dropping the handle cancels the
/// task and releases the connection.
///
/// # Example
///
/// ```ignore
/// let mut stream = client.messages().stream(&token, "acme", "main")?;
/// while let Some(message) = stream.recv().await {
///     println!("{:?}", message.content());
/// }
/// if let StreamStatus::Failed(err) = stream.status() {
///     eprintln!("stream died: {}", err);
/// }
/// ```
pub struct MessageStream {
    messages: mpsc::Receiver<Message>,
    status_rx: watch::Receiver<StreamStatus>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MessageStream {
    /// Start consuming `frames` on a background task.
    ///
    /// Must be called from within a Tokio runtime. `label` identifies the
    /// subscription in log output and must not contain secrets.
    pub fn spawn(frames: FrameStream, policy: FramePolicy, label: impl Into<String>) -> Self {
        let label = label.into();
        let (message_tx, messages) = mpsc::channel::<Message>(1);
        let (status_tx, status_rx) = watch::channel(StreamStatus::Open);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        info!(stream = %label, ?policy, "Message stream opened");

        let task = tokio::spawn(run_message_loop(
            frames,
            message_tx,
            status_tx,
            shutdown_rx,
            policy,
            label,
        ));

        Self {
            messages,
            status_rx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Receive the next message, or `None` once the stream has stopped and
    /// every delivered message was read.
    pub async fn recv(&mut self) -> Option<Message> {
        self.messages.recv().await
    }

    /// Current status.
    pub fn status(&self) -> StreamStatus {
        self.status_rx.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn status_receiver(&self) -> watch::Receiver<StreamStatus> {
        self.status_rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.status_rx.borrow().is_terminal()
    }

    /// Wait until the task stops and return how it ended.
    ///
    /// Messages are not consumed; with the one-message buffer full the task
    /// waits for the caller, so drain with [`recv`](Self::recv) first.
    pub async fn wait(&self) -> StreamStatus {
        let mut status_rx = self.status_rx.clone();
        loop {
            let status = status_rx.borrow_and_update().clone();
            if status.is_terminal() {
                return status;
            }
            if status_rx.changed().await.is_err() {
                return status_rx.borrow().clone();
            }
        }
    }

    /// Stop the task and wait for it to exit.
    ///
    /// Nothing is sent on the channel after this returns. If the stream had
    /// already stopped its status is kept, otherwise it becomes
    /// [`StreamStatus::Cancelled`].
    pub async fn close(&mut self) -> StreamStatus {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                error!(error = %err, "Message stream task panicked");
            }
        }
        self.status()
    }
}

impl Stream for MessageStream {
    type Item = Message;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Message>> {
        self.get_mut().messages.poll_recv(cx)
    }
}

impl Drop for MessageStream {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

impl std::fmt::Debug for MessageStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStream")
            .field("status", &*self.status_rx.borrow())
            .finish_non_exhaustive()
    }
}

/// Read, decode and forward frames until the stream stops.
async fn run_message_loop(
    mut frames: FrameStream,
    message_tx: mpsc::Sender<Message>,
    status_tx: watch::Sender<StreamStatus>,
    mut shutdown_rx: oneshot::Receiver<()>,
    policy: FramePolicy,
    label: String,
) {
    let mut delivered: u64 = 0;

    let status = loop {
        let next = tokio::select! {
            biased;
            _ = &mut shutdown_rx => break StreamStatus::Cancelled,
            next = frames.next() => next,
        };

        let frame = match next {
            Some(Ok(frame)) => frame,
            Some(Err(err)) => {
                error!(stream = %label, error = %err, code = err.error_code(), "Event stream read failed");
                break StreamStatus::Failed(err);
            }
            None => {
                info!(stream = %label, "Event stream ended");
                break StreamStatus::Ended;
            }
        };

        let message = match decode_frame(&frame) {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(err) => match policy {
                FramePolicy::Skip => {
                    warn!(stream = %label, error = %err, "Skipping malformed frame");
                    continue;
                }
                FramePolicy::Terminate => {
                    error!(stream = %label, error = %err, "Malformed frame, closing stream");
                    break StreamStatus::Failed(err);
                }
            },
        };

        debug!(
            stream = %label,
            id = ?message.id,
            event = ?message.event,
            "Message received"
        );

        tokio::select! {
            biased;
            _ = &mut shutdown_rx => break StreamStatus::Cancelled,
            sent = message_tx.send(message) => {
                if sent.is_err() {
                    debug!(stream = %label, "Receiver dropped");
                    break StreamStatus::Cancelled;
                }
                delivered += 1;
            }
        }
    };

    // connection released before the status is published, channel closed after
    drop(frames);

    match &status {
        StreamStatus::Cancelled => info!(stream = %label, delivered, "Message stream cancelled"),
        _ => debug!(stream = %label, delivered, status = ?status, "Message stream stopped"),
    }
    let _ = status_tx.send(status);
    drop(message_tx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockEventSource;
    use crate::sse::Frame;
    use crate::traits::EventSource;
    use std::time::Duration;

    fn message_json(id: i64) -> String {
        format!(r#"{{"id":{},"event":"message","content":"msg {}"}}"#, id, id)
    }

    fn spawn(source: &MockEventSource, policy: FramePolicy) -> MessageStream {
        let frames = source.open("https://stream.test/flows/a/b").unwrap();
        MessageStream::spawn(frames, policy, "a/b")
    }

    async fn drain(stream: &mut MessageStream) -> Vec<i64> {
        let mut ids = Vec::new();
        while let Some(message) = stream.recv().await {
            ids.push(message.id.unwrap());
        }
        ids
    }

    #[tokio::test]
    async fn test_delivers_every_frame_in_order() {
        let source = MockEventSource::new();
        for id in 1..=20 {
            source.push_data(message_json(id));
        }
        source.finish();

        let mut stream = spawn(&source, FramePolicy::Terminate);
        let ids = drain(&mut stream).await;

        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
        assert_eq!(stream.wait().await, StreamStatus::Ended);
        assert!(stream.is_finished());
    }

    #[tokio::test]
    async fn test_read_error_after_k_frames() {
        let source = MockEventSource::new();
        for id in 1..=3 {
            source.push_data(message_json(id));
        }
        let lost = StreamError::ConnectionLost {
            message: "reset by peer".to_string(),
        };
        source.push_error(lost.clone());
        source.push_data(message_json(4));

        let mut stream = spawn(&source, FramePolicy::Terminate);
        let ids = drain(&mut stream).await;

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(stream.status(), StreamStatus::Failed(lost));
        assert!(source.is_released());
    }

    #[tokio::test]
    async fn test_malformed_frame_terminates_by_default() {
        let source = MockEventSource::new();
        source.push_data(message_json(1));
        source.push_data("{not json");
        source.push_data(message_json(2));
        source.finish();

        let mut stream = spawn(&source, FramePolicy::Terminate);
        let ids = drain(&mut stream).await;

        assert_eq!(ids, vec![1]);
        assert!(matches!(
            stream.status().error(),
            Some(StreamError::InvalidJson { .. })
        ));
    }

    #[tokio::test]
    async fn test_skip_policy_continues_past_malformed_frame() {
        let source = MockEventSource::new();
        source.push_data(message_json(1));
        source.push_data("{not json");
        source.push_data(message_json(2));
        source.finish();

        let mut stream = spawn(&source, FramePolicy::Skip);
        let ids = drain(&mut stream).await;

        assert_eq!(ids, vec![1, 2]);
        assert_eq!(stream.status(), StreamStatus::Ended);
    }

    #[tokio::test]
    async fn test_keep_alive_frames_are_ignored() {
        let source = MockEventSource::new();
        source.push_frame(Frame::data(""));
        source.push_data(message_json(7));
        source.push_frame(Frame::data("\n"));
        source.finish();

        let mut stream = spawn(&source, FramePolicy::Terminate);
        assert_eq!(drain(&mut stream).await, vec![7]);
        assert_eq!(stream.status(), StreamStatus::Ended);
    }

    #[tokio::test]
    async fn test_close_cancels_and_releases_connection() {
        let source = MockEventSource::new();
        source.push_data(message_json(1));

        let mut stream = spawn(&source, FramePolicy::Terminate);
        assert_eq!(stream.recv().await.and_then(|m| m.id), Some(1));
        assert_eq!(stream.status(), StreamStatus::Open);

        assert_eq!(stream.close().await, StreamStatus::Cancelled);
        assert!(source.is_released());

        // frames arriving after close are never delivered
        source.push_data(message_json(2));
        assert_eq!(stream.recv().await, None);
    }

    #[tokio::test]
    async fn test_close_while_blocked_on_send() {
        let source = MockEventSource::new();
        for id in 1..=5 {
            source.push_data(message_json(id));
        }

        let mut stream = spawn(&source, FramePolicy::Terminate);
        // let the task fill the buffer and block on the next send
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(stream.close().await, StreamStatus::Cancelled);
        let ids = drain(&mut stream).await;
        assert!(ids.len() <= 1, "at most one buffered message, got {:?}", ids);
    }

    #[tokio::test]
    async fn test_close_after_end_keeps_status() {
        let source = MockEventSource::new();
        source.finish();

        let mut stream = spawn(&source, FramePolicy::Terminate);
        assert_eq!(stream.wait().await, StreamStatus::Ended);
        assert_eq!(stream.close().await, StreamStatus::Ended);
    }

    #[tokio::test]
    async fn test_drop_cancels_task() {
        let source = MockEventSource::new();
        let stream = spawn(&source, FramePolicy::Terminate);
        let mut status_rx = stream.status_receiver();

        drop(stream);

        tokio::time::timeout(Duration::from_secs(1), async {
            while !status_rx.borrow_and_update().is_terminal() {
                if status_rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .expect("task did not stop");
        assert_eq!(*status_rx.borrow(), StreamStatus::Cancelled);
        assert!(source.is_released());
    }

    #[tokio::test]
    async fn test_stream_impl() {
        let source = MockEventSource::new();
        source.push_data(message_json(1));
        source.push_data(message_json(2));
        source.finish();

        let stream = spawn(&source, FramePolicy::Terminate);
        let ids: Vec<_> = stream.filter_map(|m| async move { m.id }).collect().await;
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_status_helpers() {
        assert!(!StreamStatus::Open.is_terminal());
        assert!(StreamStatus::Ended.is_terminal());
        assert!(StreamStatus::Cancelled.is_terminal());
        assert_eq!(StreamStatus::Ended.error(), None);
        assert_eq!(FramePolicy::default(), FramePolicy::Terminate);
    }
}
