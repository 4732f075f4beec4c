//! Parameter bundles for the message endpoints.
//!
//! Every option is omitted from the request when it holds its zero value
//! (empty string, `0`, empty tag list, no tag mode). Tag lists are sent
//! comma-joined in a single parameter.

use std::fmt;

use uuid::Uuid;

/// Ordered `(name, value)` pairs for a query string or form body.
pub type Params = Vec<(&'static str, String)>;

/// Conversion of an options bundle into request parameters.
pub trait ToParams {
    fn to_params(&self) -> Params;
}

/// How a tag filter combines multiple tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    /// Messages must carry every tag
    And,
    /// Messages must carry at least one tag
    Or,
}

impl TagMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagMode::And => "and",
            TagMode::Or => "or",
        }
    }
}

impl fmt::Display for TagMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulates parameters, skipping zero values.
#[derive(Default)]
struct ParamsBuilder {
    params: Params,
}

impl ParamsBuilder {
    fn str(mut self, name: &'static str, value: &str) -> Self {
        if !value.is_empty() {
            self.params.push((name, value.to_string()));
        }
        self
    }

    fn int(mut self, name: &'static str, value: i64) -> Self {
        if value != 0 {
            self.params.push((name, value.to_string()));
        }
        self
    }

    fn tags(mut self, name: &'static str, tags: &[String]) -> Self {
        if !tags.is_empty() {
            self.params.push((name, tags.join(",")));
        }
        self
    }

    fn build(self) -> Params {
        self.params
    }
}

/// Filters for listing a flow's messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Only messages of these event kinds (comma separated)
    pub event: String,
    /// Maximum number of messages returned
    pub limit: i64,
    /// Only messages with an id greater than this
    pub since_id: i64,
    /// Only messages with an id less than this
    pub until_id: i64,
    pub tags: Vec<String>,
    pub tag_mode: Option<TagMode>,
    /// Full-text search
    pub search: String,
}

impl ToParams for ListOptions {
    fn to_params(&self) -> Params {
        let mut builder = ParamsBuilder::default()
            .str("event", &self.event)
            .int("limit", self.limit)
            .int("since_id", self.since_id)
            .int("until_id", self.until_id)
            .tags("tags", &self.tags);
        if let Some(mode) = self.tag_mode {
            builder = builder.str("tag_mode", mode.as_str());
        }
        builder.str("search", &self.search).build()
    }
}

/// Changes applied by editing a message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditOptions {
    pub content: String,
    pub tags: Vec<String>,
}

impl ToParams for EditOptions {
    fn to_params(&self) -> Params {
        ParamsBuilder::default()
            .str("content", &self.content)
            .tags("tags", &self.tags)
            .build()
    }
}

/// Fields of a message or comment to create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateOptions {
    /// Flow id (not the parameterized name)
    pub flow: String,
    /// Id of the message a comment replies to
    pub message: i64,
    pub event: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Idempotency key; see [`CreateOptions::with_generated_uuid`]
    pub uuid: String,
    pub external_user_name: String,
    pub subject: String,
    pub from_address: String,
    pub source: String,
}

impl CreateOptions {
    /// Fill `uuid` with a random v4 UUID if it is empty, so a retried create
    /// does not post the message twice.
    pub fn with_generated_uuid(mut self) -> Self {
        if self.uuid.is_empty() {
            self.uuid = Uuid::new_v4().to_string();
        }
        self
    }
}

impl ToParams for CreateOptions {
    fn to_params(&self) -> Params {
        ParamsBuilder::default()
            .str("flow", &self.flow)
            .int("message", self.message)
            .str("event", &self.event)
            .str("content", &self.content)
            .tags("tags", &self.tags)
            .str("uuid", &self.uuid)
            .str("external_user_name", &self.external_user_name)
            .str("subject", &self.subject)
            .str("from_address", &self.from_address)
            .str("source", &self.source)
            .build()
    }
}

/// Fields of a team inbox item posted through the push API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboxCreateOptions {
    /// Human readable identifier of the posting application
    pub source: String,
    pub from_address: String,
    pub subject: String,
    pub content: String,
    pub from_name: String,
    pub reply_to: String,
    pub project: String,
    /// `html` (default on the server) or `markdown`
    pub format: String,
    pub link: String,
    pub tags: Vec<String>,
}

impl ToParams for InboxCreateOptions {
    fn to_params(&self) -> Params {
        ParamsBuilder::default()
            .str("source", &self.source)
            .str("from_address", &self.from_address)
            .str("subject", &self.subject)
            .str("content", &self.content)
            .str("from_name", &self.from_name)
            .str("reply_to", &self.reply_to)
            .str("project", &self.project)
            .str("format", &self.format)
            .str("link", &self.link)
            .tags("tags", &self.tags)
            .build()
    }
}
