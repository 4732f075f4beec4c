//! Typed message content.
//!
//! A message's `content` field changes shape with its event kind. Resolution
//! is a pure function of `(event, raw content)` and never guesses: content that
//! does not fit the selected shape is an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Content of a plain chat message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct MessageContent(pub String);

impl MessageContent {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content of a comment. The commented message is referenced by
/// [`Message::message_id`](super::Message::message_id).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentContent {
    /// Title of the commented item
    #[serde(default)]
    pub title: String,
    pub text: String,
}

impl fmt::Display for CommentContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A person in a version-control event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VcsPerson {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A single commit in a push.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VcsCommit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<VcsPerson>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VcsRepository {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<VcsPerson>,
}

/// Commit and branch metadata of a version-control event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VcsPayload {
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub ref_name: String,
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
    #[serde(default)]
    pub compare: String,
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub forced: bool,
    #[serde(default)]
    pub commits: Vec<VcsCommit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<VcsRepository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pusher: Option<VcsPerson>,
}

impl VcsPayload {
    /// Branch name, falling back to the last segment of the full ref.
    pub fn branch(&self) -> &str {
        if !self.ref_name.is_empty() {
            return &self.ref_name;
        }
        self.git_ref.rsplit('/').next().unwrap_or(&self.git_ref)
    }
}

/// Content of a version-control (`vcs`) event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VcsContent {
    /// VCS event type, e.g. `push`
    pub event: String,
    pub payload: VcsPayload,
}

impl fmt::Display for VcsContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = &self.payload;
        let who = payload
            .pusher
            .as_ref()
            .map(|p| p.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("someone");
        let repo = payload
            .repository
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or("");

        match self.event.as_str() {
            "push" => {
                let count = payload.commits.len();
                let noun = if count == 1 { "commit" } else { "commits" };
                write!(f, "{} pushed {} {} to {}", who, count, noun, payload.branch())?;
            }
            "" => write!(f, "{} updated {}", who, payload.branch())?,
            other => write!(f, "{} {} on {}", who, other, payload.branch())?,
        }

        if !repo.is_empty() {
            write!(f, " ({})", repo)?;
        }

        for commit in &payload.commits {
            let short = commit.id.get(..7).unwrap_or(&commit.id);
            let summary = commit.message.lines().next().unwrap_or("");
            write!(f, "\n{} {}", short, summary)?;
        }

        Ok(())
    }
}

/// Content of a message, selected by its event kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// `event = "message"`
    Message(MessageContent),
    /// `event = "comment"`
    Comment(CommentContent),
    /// `event = "vcs"`
    Vcs(VcsContent),
    /// Any other or missing event kind; the content is kept as JSON.
    Json(serde_json::Value),
}

impl Content {
    /// Decode `raw` into the variant selected by `event`.
    pub fn resolve(event: Option<&str>, raw: &serde_json::Value) -> Result<Self, ContentError> {
        match event {
            Some("message") => decode(raw, "message").map(Content::Message),
            Some("comment") => decode_object(raw, "comment").map(Content::Comment),
            Some("vcs") => {
                let has_ref_or_commits = raw
                    .get("payload")
                    .is_some_and(|p| p.get("ref").is_some() || p.get("commits").is_some());
                if !has_ref_or_commits {
                    return Err(invalid("vcs", "payload has neither ref nor commits"));
                }
                decode_object(raw, "vcs").map(Content::Vcs)
            }
            _ => Ok(Content::Json(raw.clone())),
        }
    }

    /// The event kind this variant belongs to, `None` for generic JSON.
    pub fn event_kind(&self) -> Option<&'static str> {
        match self {
            Content::Message(_) => Some("message"),
            Content::Comment(_) => Some("comment"),
            Content::Vcs(_) => Some("vcs"),
            Content::Json(_) => None,
        }
    }
}

fn invalid(event: &str, message: impl Into<String>) -> ContentError {
    ContentError::InvalidPayload {
        event: event.to_string(),
        message: message.into(),
    }
}

fn decode<T>(raw: &serde_json::Value, event: &str) -> Result<T, ContentError>
where
    T: serde::de::DeserializeOwned,
{
    T::deserialize(raw).map_err(|e| invalid(event, e.to_string()))
}

/// Struct variants only accept JSON objects; serde would also take arrays.
fn decode_object<T>(raw: &serde_json::Value, event: &str) -> Result<T, ContentError>
where
    T: serde::de::DeserializeOwned,
{
    if !raw.is_object() {
        return Err(invalid(event, "expected a JSON object"));
    }
    decode(raw, event)
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Message(content) => fmt::Display::fmt(content, f),
            Content::Comment(content) => fmt::Display::fmt(content, f),
            Content::Vcs(content) => fmt::Display::fmt(content, f),
            Content::Json(serde_json::Value::String(text)) => f.write_str(text),
            Content::Json(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_message() {
        let content = Content::resolve(Some("message"), &json!("Hello #world")).unwrap();
        assert_eq!(
            content,
            Content::Message(MessageContent("Hello #world".to_string()))
        );
        assert_eq!(content.to_string(), "Hello #world");
    }

    #[test]
    fn test_resolve_comment() {
        let raw = json!({ "title": "Release plan", "text": "Ship it" });
        let content = Content::resolve(Some("comment"), &raw).unwrap();

        match &content {
            Content::Comment(comment) => {
                assert_eq!(comment.title, "Release plan");
                assert_eq!(comment.text, "Ship it");
            }
            other => panic!("Expected Comment content, got {:?}", other),
        }
        assert_eq!(content.to_string(), "Ship it");
    }

    #[test]
    fn test_resolve_vcs_push() {
        let raw = json!({
            "event": "push",
            "payload": {
                "ref": "refs/heads/main",
                "before": "a1",
                "after": "b2",
                "commits": [
                    { "id": "0123456789abcdef", "message": "Fix stream reconnect\n\nDetails", "url": "https://example.com/c/1" },
                    { "id": "fedcba9876543210", "message": "Bump version", "url": "https://example.com/c/2" }
                ],
                "repository": { "name": "flowdock-rs", "url": "https://example.com/r" },
                "pusher": { "name": "Jackie", "email": "jackie@example.com" }
            }
        });

        let content = Content::resolve(Some("vcs"), &raw).unwrap();
        let Content::Vcs(vcs) = &content else {
            panic!("Expected Vcs content, got {:?}", content);
        };

        assert_eq!(vcs.event, "push");
        assert_eq!(vcs.payload.branch(), "main");
        assert_eq!(vcs.payload.commits.len(), 2);
        assert_eq!(
            content.to_string(),
            "Jackie pushed 2 commits to main (flowdock-rs)\n0123456 Fix stream reconnect\nfedcba9 Bump version"
        );
    }

    #[test]
    fn test_unknown_and_missing_event_fall_back_to_json() {
        let raw = json!({ "status": "away" });

        assert_eq!(
            Content::resolve(Some("status"), &raw).unwrap(),
            Content::Json(raw.clone())
        );
        assert_eq!(Content::resolve(None, &raw).unwrap(), Content::Json(raw));
    }

    #[test]
    fn test_mismatched_shape_is_an_error() {
        let err = Content::resolve(Some("message"), &json!({ "text": "not a string" })).unwrap_err();
        assert!(matches!(err, ContentError::InvalidPayload { ref event, .. } if event == "message"));

        let err = Content::resolve(Some("comment"), &json!(["list"])).unwrap_err();
        assert!(matches!(err, ContentError::InvalidPayload { ref event, .. } if event == "comment"));
    }

    #[test]
    fn test_wrong_shapes_never_decode_to_defaults() {
        for event in ["comment", "vcs"] {
            for raw in [json!([]), json!({}), json!({"x": 1}), json!(["list"]), json!("text")] {
                let result = Content::resolve(Some(event), &raw);
                assert!(
                    matches!(result, Err(ContentError::InvalidPayload { event: ref e, .. }) if e == event),
                    "{} content {} resolved to {:?}",
                    event,
                    raw,
                    result
                );
            }
        }
    }

    #[test]
    fn test_comment_requires_text() {
        let err = Content::resolve(Some("comment"), &json!({ "title": "only a title" })).unwrap_err();
        assert!(matches!(err, ContentError::InvalidPayload { .. }));

        let content = Content::resolve(Some("comment"), &json!({ "text": "no title" })).unwrap();
        assert_eq!(content.to_string(), "no title");
    }

    #[test]
    fn test_vcs_requires_event_payload_and_ref_or_commits() {
        let missing_event = json!({ "payload": { "ref": "refs/heads/main" } });
        assert!(Content::resolve(Some("vcs"), &missing_event).is_err());

        let empty_payload = json!({ "event": "push", "payload": {} });
        assert!(Content::resolve(Some("vcs"), &empty_payload).is_err());

        let wrong_payload = json!({ "event": "push", "payload": { "x": 1 } });
        assert!(Content::resolve(Some("vcs"), &wrong_payload).is_err());

        let commits_only = json!({ "event": "push", "payload": { "commits": [] } });
        assert!(matches!(
            Content::resolve(Some("vcs"), &commits_only),
            Ok(Content::Vcs(_))
        ));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let raw = json!({ "title": "t", "text": "x" });
        let first = Content::resolve(Some("comment"), &raw).unwrap();
        let second = Content::resolve(Some("comment"), &raw).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(
            Content::Message(MessageContent::default()).event_kind(),
            Some("message")
        );
        assert_eq!(Content::Json(json!(null)).event_kind(), None);
    }

    #[test]
    fn test_json_display() {
        assert_eq!(Content::Json(json!("plain")).to_string(), "plain");
        assert_eq!(Content::Json(json!({"a": 1})).to_string(), r#"{"a":1}"#);
    }
}
