//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`EventSourceClient`] - Server-sent events using eventsource-client
//!
//! The [`mock`] submodule provides test doubles for both.

pub mod eventsource;
pub mod mock;
pub mod reqwest_http;

pub use eventsource::EventSourceClient;
pub use mock::{MockEventSource, MockHttpClient, MockResponse};
pub use reqwest_http::ReqwestHttpClient;
