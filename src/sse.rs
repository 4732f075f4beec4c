//! Server-sent event frames and the message decoder.
//!
//! The streaming endpoint sends one JSON-encoded [`Message`] in the data
//! field of every event. Parsing the event-stream wire format itself is left
//! to the [`EventSource`](crate::traits::EventSource) implementation.

use crate::error::StreamError;
use crate::models::Message;

/// One event delivered by an event source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// SSE event type, `message` when the server sent none
    pub event: String,
    /// Payload, multiple data lines joined with `\n`
    pub data: String,
    /// Last event id, if the server set one
    pub id: Option<String>,
}

impl Frame {
    /// Create a frame carrying only data.
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            event: "message".to_string(),
            data: data.into(),
            id: None,
        }
    }

    /// Frames without a payload are keep-alives.
    pub fn is_keep_alive(&self) -> bool {
        self.data.trim().is_empty()
    }
}

/// Decode one frame payload into a [`Message`].
pub fn decode_message(data: &str) -> Result<Message, StreamError> {
    serde_json::from_str(data).map_err(|e| StreamError::InvalidJson {
        message: e.to_string(),
        data: data.to_string(),
    })
}

/// Decode a frame, returning `None` for keep-alives.
pub fn decode_frame(frame: &Frame) -> Result<Option<Message>, StreamError> {
    if frame.is_keep_alive() {
        return Ok(None);
    }
    decode_message(&frame.data).map(Some)
}
