//! Trait abstractions over the transports.
//!
//! - [`HttpClient`] - request/response calls for the REST endpoints
//! - [`EventSource`] - server-sent event streams for live messages

pub mod event_source;
pub mod http;

pub use event_source::{EventSource, FrameStream};
pub use http::{Headers, HttpClient, HttpError, Method, Request, Response};
