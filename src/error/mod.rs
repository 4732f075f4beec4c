//! Error handling for the Flowdock client.
//!
//! Every public operation returns [`FlowdockResult`]. The unified
//! [`FlowdockError`] wraps one domain error per failure class:
//!
//! | Variant | Raised when | Retryable |
//! |---------|-------------|-----------|
//! | `Request` | parameters cannot form a request (before any I/O) | No |
//! | `Network` | transport failure or non-2xx response | 5xx/429/timeouts |
//! | `Stream` | a live subscription ended abnormally | Connection loss |
//! | `Content` | a message's content cannot be resolved | No |
//!
//! # Example
//!
//! ```ignore
//! use flowdock::error::{ErrorContext, ResultExt};
//!
//! let messages = client
//!     .messages()
//!     .list("acme", "main", &Default::default())
//!     .await
//!     .context(ErrorContext::new("backfill").with_flow("acme", "main"))?;
//! ```

mod category;
mod content;
mod context;
mod flowdock_error;
mod network;
mod request;
mod result;
mod stream;

pub use category::ErrorCategory;
pub use content::ContentError;
pub use context::ErrorContext;
pub use flowdock_error::FlowdockError;
pub use network::{classify_reqwest_error, NetworkError};
pub use request::RequestError;
pub use result::{FlowdockResult, ResultExt};
pub use stream::StreamError;
