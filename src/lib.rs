//! Flowdock - async client for the Flowdock REST and streaming APIs.
//!
//! ```ignore
//! use flowdock::{Client, ClientConfig, CreateOptions, StreamStatus};
//!
//! let client = Client::new(ClientConfig::new().with_token(token.clone()))?;
//!
//! client
//!     .messages()
//!     .create(&CreateOptions {
//!         flow: flow_id,
//!         event: "message".into(),
//!         content: "Deploy finished".into(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let mut stream = client.messages().stream(&token, "acme", "main")?;
//! while let Some(message) = stream.recv().await {
//!     println!("{}", message.content()?);
//! }
//! ```

pub mod adapters;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod inbox;
pub mod messages;
pub mod models;
pub mod sse;
pub mod stream;
pub mod traits;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{FlowdockError, FlowdockResult};
pub use inbox::InboxService;
pub use messages::MessagesService;
pub use models::{
    CommentContent, Content, CreateOptions, EditOptions, InboxCreateOptions, ListOptions,
    Message, MessageContent, TagMode, VcsContent,
};
pub use stream::{FramePolicy, MessageStream, StreamStatus};
