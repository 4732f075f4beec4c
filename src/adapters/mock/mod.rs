//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`MockEventSource`] - Event stream with frame injection

pub mod event_source;
pub mod http;

pub use event_source::MockEventSource;
pub use http::{MockHttpClient, MockResponse};
