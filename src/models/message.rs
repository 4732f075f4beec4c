use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::content::Content;
use crate::error::ContentError;

/// Deserialize an optional message id given either as an integer or a numeric string.
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer, a numeric string or null")
        }

        fn visit_none<E>(self) -> Result<Option<i64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Option<i64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Option<i64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(IdVisitor)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Option<i64>, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Option<i64>, E>
        where
            E: de::Error,
        {
            i64::try_from(value)
                .map(Some)
                .map_err(|_| E::custom(format!("id {} out of range", value)))
        }

        fn visit_str<E>(self, value: &str) -> Result<Option<i64>, E>
        where
            E: de::Error,
        {
            value
                .parse::<i64>()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid id '{}'", value)))
        }
    }

    deserializer.deserialize_option(IdVisitor)
}

/// A Flowdock message as carried by the REST and streaming APIs.
///
/// Every field is optional: different event kinds populate different subsets
/// and the API omits absent fields. Absent fields are skipped again on
/// serialization, so decoding and re-encoding keeps the same set of keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Message id, unique within the flow.
    ///
    /// Some endpoints send ids as numeric strings (`"42"`). Both forms decode
    /// to the same value and are always encoded back as a JSON number.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,
    /// Id of the flow the message belongs to
    #[serde(rename = "flow", default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
    /// Time the message was sent, epoch milliseconds on the wire
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sent: Option<DateTime<Utc>>,
    /// Id of the author
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Event kind: `message`, `comment`, `vcs`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Undecoded content; see [`Message::content`]
    #[serde(rename = "content", default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<serde_json::Value>,
    /// Id of the message a comment replies to. Encoded as a number, like `id`.
    #[serde(
        rename = "message",
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Client-generated idempotency key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_user_name: Option<String>,
    /// Deprecated by the API, still sent by some integrations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
}

impl Message {
    /// Resolve the raw content into the variant selected by the event kind.
    ///
    /// Fails with [`ContentError::MissingContent`] when the message has no
    /// content, and with [`ContentError::InvalidPayload`] when the content does
    /// not match the shape of its event kind.
    pub fn content(&self) -> Result<Content, ContentError> {
        let raw = self
            .raw_content
            .as_ref()
            .ok_or(ContentError::MissingContent)?;
        Content::resolve(self.event.as_deref(), raw)
    }

    /// Check whether this message is a comment on another message.
    pub fn is_comment(&self) -> bool {
        self.event.as_deref() == Some("comment")
    }

    /// Id of the message this one replies to.
    pub fn parent_id(&self) -> Option<i64> {
        self.message_id
    }

    /// Check whether the message carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }
}
