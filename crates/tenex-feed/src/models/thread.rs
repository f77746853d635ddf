use serde::Serialize;

use super::tag_utils::{extract_all_tag_values, extract_tag_str};
use super::FeedEvent;
use crate::constants::{tags, DEFAULT_THREAD_TITLE, PREVIEW_MAX_CHARS, TITLE_MAX_CHARS};

/// Thread row as handed to list renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadView {
    pub id: String,
    pub pubkey: String,
    pub title: String,
    /// Latest reply content, or the thread's own content when it has no replies
    pub preview: String,
    pub reply_count: usize,
    pub participant_count: usize,
    pub created_at: Option<u64>,
    /// Max of the thread's creation time and its latest reply
    pub last_activity: Option<u64>,
    /// Workflow phase from the most recent `phase` tag among replies
    pub phase: Option<String>,
    pub hashtags: Vec<String>,
    /// Project display name resolved through the caller's lookup map
    pub project: Option<String>,
}

impl ThreadView {
    /// Ordering time: last activity, falling back to creation time.
    pub fn sort_time(&self) -> Option<u64> {
        self.last_activity.or(self.created_at)
    }
}

/// `title` tag, else the first non-empty content line, else the default.
pub fn thread_title(thread: &FeedEvent) -> String {
    if let Some(title) = extract_tag_str(thread, tags::TITLE).map(str::trim) {
        if !title.is_empty() {
            return title.to_string();
        }
    }
    thread
        .content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| truncate_chars(line, TITLE_MAX_CHARS))
        .unwrap_or_else(|| DEFAULT_THREAD_TITLE.to_string())
}

/// Hashtags in first-seen order without duplicates.
pub fn thread_hashtags(thread: &FeedEvent) -> Vec<String> {
    let mut hashtags: Vec<String> = Vec::new();
    for tag in extract_all_tag_values(thread, tags::HASHTAG) {
        if !hashtags.contains(&tag) {
            hashtags.push(tag);
        }
    }
    hashtags
}

/// Collapse whitespace to single spaces and cap the length.
pub fn preview_text(content: &str) -> String {
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, PREVIEW_MAX_CHARS)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
