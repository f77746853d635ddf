use nostr_sdk::Event;
use serde::{Deserialize, Serialize};

use super::tag_utils::extract_tag_str;
use crate::constants::{kinds, tags};

/// Read-only view of a Nostr event as the feed logic consumes it.
///
/// `created_at` is optional so that partially-formed events (hand-written
/// JSON, truncated relay payloads) can flow through the pipeline and be
/// excluded from time-based views instead of failing the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub id: String,
    pub pubkey: String,
    pub kind: u16,
    #[serde(default)]
    pub created_at: Option<u64>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
}

impl FeedEvent {
    pub fn new(
        id: impl Into<String>,
        pubkey: impl Into<String>,
        kind: u16,
        created_at: Option<u64>,
    ) -> Self {
        Self {
            id: id.into(),
            pubkey: pubkey.into(),
            kind,
            created_at,
            content: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_tag<I, S>(mut self, tag: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.push(tag.into_iter().map(Into::into).collect());
        self
    }

    /// Root conversation this event belongs to (uppercase `E` tag).
    /// A lowercase `e` tag is a generic reference and never a root.
    pub fn root_ref(&self) -> Option<&str> {
        extract_tag_str(self, tags::ROOT)
    }

    /// Immediate parent reply, if the event names one.
    pub fn parent_ref(&self) -> Option<&str> {
        extract_tag_str(self, tags::REFERENCE)
    }

    pub fn is_thread(&self) -> bool {
        self.kind == kinds::THREAD
    }

    /// Whether this event counts toward reply badges and participants.
    pub fn is_qualifying_reply(&self) -> bool {
        kinds::is_reply_kind(self.kind)
    }

    pub fn project_ref(&self) -> Option<&str> {
        extract_tag_str(self, tags::PROJECT)
    }
}

impl From<&Event> for FeedEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_hex(),
            pubkey: event.pubkey.to_hex(),
            kind: event.kind.as_u16(),
            created_at: Some(event.created_at.as_u64()),
            content: event.content.clone(),
            tags: event
                .tags
                .iter()
                .map(|tag| tag.as_slice().to_vec())
                .collect(),
        }
    }
}

impl From<Event> for FeedEvent {
    fn from(event: Event) -> Self {
        Self::from(&event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostr_sdk::prelude::*;

    #[test]
    fn test_from_signed_event_keeps_tags_in_order() {
        let keys = Keys::generate();
        let event = EventBuilder::new(Kind::Custom(1111), "reply body")
            .tag(Tag::custom(TagKind::custom("E"), ["root-id"]))
            .tag(Tag::custom(TagKind::custom("e"), ["parent-id"]))
            .tag(Tag::custom(TagKind::custom("phase"), ["review"]))
            .custom_created_at(Timestamp::from(1_700_000_000))
            .sign_with_keys(&keys)
            .unwrap();

        let feed_event = FeedEvent::from(&event);

        assert_eq!(feed_event.id, event.id.to_hex());
        assert_eq!(feed_event.pubkey, keys.public_key().to_hex());
        assert_eq!(feed_event.kind, 1111);
        assert_eq!(feed_event.created_at, Some(1_700_000_000));
        assert_eq!(feed_event.content, "reply body");
        assert_eq!(feed_event.root_ref(), Some("root-id"));
        assert_eq!(feed_event.parent_ref(), Some("parent-id"));
        assert!(feed_event.is_qualifying_reply());
        assert_eq!(feed_event.tags[2], vec!["phase".to_string(), "review".to_string()]);
    }

    #[test]
    fn test_lowercase_e_is_not_a_root() {
        let event = FeedEvent::new("r1", "a", 1111, Some(1)).with_tag(["e", "thread"]);
        assert_eq!(event.root_ref(), None);
        assert_eq!(event.parent_ref(), Some("thread"));
    }

    #[test]
    fn test_deserialize_event_without_created_at() {
        let json = r#"{"id":"abc","pubkey":"def","kind":11,"content":"hi","tags":[["title","T"]],"sig":"00"}"#;
        let event: FeedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.created_at, None);
        assert!(event.is_thread());
        assert_eq!(event.tags, vec![vec!["title".to_string(), "T".to_string()]]);
    }
}
