use serde::Serialize;

use super::tag_utils::extract_tag_str;
use super::thread::{preview_text, thread_title};
use super::FeedEvent;
use crate::constants::{kinds, tags};

/// One feed row, dispatched on event kind.
///
/// Every kind-specific rendering decision lives here so that feed and
/// event-detail views share a single implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedItem {
    Thread {
        id: String,
        author: String,
        title: String,
        created_at: Option<u64>,
    },
    Reply {
        id: String,
        author: String,
        root: Option<String>,
        preview: String,
        created_at: Option<u64>,
    },
    Task {
        id: String,
        author: String,
        root: Option<String>,
        title: String,
        status: Option<String>,
        created_at: Option<u64>,
    },
    Reaction {
        id: String,
        author: String,
        target: Option<String>,
        reaction: String,
        created_at: Option<u64>,
    },
    Profile {
        id: String,
        author: String,
        name: Option<String>,
        created_at: Option<u64>,
    },
    Project {
        id: String,
        author: String,
        name: String,
        created_at: Option<u64>,
    },
    Other {
        id: String,
        author: String,
        kind: u16,
        created_at: Option<u64>,
    },
}

impl FeedItem {
    pub fn from_event(event: &FeedEvent) -> Self {
        let id = event.id.clone();
        let author = event.pubkey.clone();
        let created_at = event.created_at;

        match event.kind {
            kinds::THREAD => Self::Thread {
                id,
                author,
                title: thread_title(event),
                created_at,
            },
            kinds::GENERIC_REPLY => Self::Reply {
                id,
                author,
                root: event.root_ref().map(str::to_string),
                preview: preview_text(&event.content),
                created_at,
            },
            kinds::TASK => Self::Task {
                id,
                author,
                root: event.root_ref().map(str::to_string),
                title: thread_title(event),
                status: extract_tag_str(event, tags::STATUS).map(str::to_string),
                created_at,
            },
            kinds::REACTION => Self::Reaction {
                id,
                author,
                // NIP-25: the reacted-to event is the last `e` tag
                target: event
                    .tags
                    .iter()
                    .rev()
                    .find(|tag| tag.first().map(String::as_str) == Some(tags::REFERENCE))
                    .and_then(|tag| tag.get(1).cloned()),
                reaction: match event.content.trim() {
                    "" => "+".to_string(),
                    other => other.to_string(),
                },
                created_at,
            },
            kinds::METADATA => Self::Profile {
                id,
                author,
                name: profile_name(&event.content),
                created_at,
            },
            kinds::PROJECT => Self::Project {
                id,
                author,
                name: extract_tag_str(event, tags::TITLE)
                    .or_else(|| extract_tag_str(event, "d"))
                    .unwrap_or("Unnamed project")
                    .to_string(),
                created_at,
            },
            kind => Self::Other {
                id,
                author,
                kind,
                created_at,
            },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Thread { id, .. }
            | Self::Reply { id, .. }
            | Self::Task { id, .. }
            | Self::Reaction { id, .. }
            | Self::Profile { id, .. }
            | Self::Project { id, .. }
            | Self::Other { id, .. } => id,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            Self::Thread { author, .. }
            | Self::Reply { author, .. }
            | Self::Task { author, .. }
            | Self::Reaction { author, .. }
            | Self::Profile { author, .. }
            | Self::Project { author, .. }
            | Self::Other { author, .. } => author,
        }
    }

    pub fn created_at(&self) -> Option<u64> {
        match self {
            Self::Thread { created_at, .. }
            | Self::Reply { created_at, .. }
            | Self::Task { created_at, .. }
            | Self::Reaction { created_at, .. }
            | Self::Profile { created_at, .. }
            | Self::Project { created_at, .. }
            | Self::Other { created_at, .. } => *created_at,
        }
    }

    /// One-line rendering used by every feed surface.
    pub fn summary(&self) -> String {
        match self {
            Self::Thread { title, .. } => format!("[thread] {}", title),
            Self::Reply { preview, .. } => format!("[reply] {}", preview),
            Self::Task { title, status, .. } => match status {
                Some(status) => format!("[task:{}] {}", status, title),
                None => format!("[task] {}", title),
            },
            Self::Reaction {
                target, reaction, ..
            } => match target {
                Some(target) => format!("[reaction] {} on {}", reaction, short_id(target)),
                None => format!("[reaction] {}", reaction),
            },
            Self::Profile { name, author, .. } => format!(
                "[profile] {}",
                name.clone().unwrap_or_else(|| short_id(author).to_string())
            ),
            Self::Project { name, .. } => format!("[project] {}", name),
            Self::Other { kind, id, .. } => format!("[kind:{}] {}", kind, short_id(id)),
        }
    }
}

fn profile_name(content: &str) -> Option<String> {
    let metadata: serde_json::Value = serde_json::from_str(content).ok()?;
    ["display_name", "name"]
        .iter()
        .filter_map(|key| metadata.get(key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

/// First 8 characters of a hex id or pubkey.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
