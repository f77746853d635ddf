//! Tag extraction utilities for feed events
//!
//! Provides helper functions to reduce boilerplate when reading tags from Nostr events.
//! Tag names are matched case-sensitively: `"E"` and `"e"` are different tags.

use super::FeedEvent;

/// Extract a single string value from a tag by name.
/// Returns the first occurrence if multiple tags exist.
pub fn extract_tag_str<'a>(event: &'a FeedEvent, tag_name: &str) -> Option<&'a str> {
    event
        .tags
        .iter()
        .find(|tag| tag.first().map(String::as_str) == Some(tag_name))
        .and_then(|tag| tag.get(1))
        .map(String::as_str)
}

/// Extract all string values for a given tag name.
/// Useful for tags that appear multiple times (e.g., "p", "t").
pub fn extract_all_tag_values(event: &FeedEvent, tag_name: &str) -> Vec<String> {
    event
        .tags
        .iter()
        .filter(|tag| tag.first().map(String::as_str) == Some(tag_name))
        .filter_map(|tag| tag.get(1).cloned())
        .collect()
}

/// Check if an event has a specific tag (regardless of value).
pub fn has_tag(event: &FeedEvent, tag_name: &str) -> bool {
    event
        .tags
        .iter()
        .any(|tag| tag.first().map(String::as_str) == Some(tag_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> FeedEvent {
        FeedEvent::new("id1", "author", 1111, Some(10))
            .with_tag(["title", "My Title"])
            .with_tag(["t", "rust"])
            .with_tag(["t", "nostr"])
            .with_tag(["E", "root"])
            .with_tag(["e", "parent"])
            .with_tag(["reasoning"])
    }

    #[test]
    fn test_extract_tag_str() {
        let event = event();
        assert_eq!(extract_tag_str(&event, "title"), Some("My Title"));
        assert_eq!(extract_tag_str(&event, "nonexistent"), None);
        assert_eq!(extract_tag_str(&event, "reasoning"), None);
    }

    #[test]
    fn test_tag_names_are_case_sensitive() {
        let event = event();
        assert_eq!(extract_tag_str(&event, "E"), Some("root"));
        assert_eq!(extract_tag_str(&event, "e"), Some("parent"));
    }

    #[test]
    fn test_extract_all_tag_values() {
        let hashtags = extract_all_tag_values(&event(), "t");
        assert_eq!(hashtags, vec!["rust".to_string(), "nostr".to_string()]);
    }

    #[test]
    fn test_has_tag() {
        let event = event();
        assert!(has_tag(&event, "reasoning"));
        assert!(!has_tag(&event, "nonexistent"));
    }
}
