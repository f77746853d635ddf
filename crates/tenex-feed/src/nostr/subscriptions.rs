use std::future::Future;
use std::time::Duration;

use nostr_sdk::prelude::*;

use crate::constants::kinds;
use crate::error::Result;
use crate::models::{FeedEvent, FeedItem};
use crate::store::{ProjectLookup, SharedEventStore};

/// Anything that can answer a one-shot filter query.
pub trait EventSource {
    fn fetch(
        &self,
        filter: Filter,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<FeedEvent>>> + Send;
}

/// Root threads (kind:11) of a project, by `a` tag.
pub fn project_threads_filter(project_a_tag: &str) -> Filter {
    Filter::new()
        .kind(Kind::from(kinds::THREAD))
        .custom_tag(
            SingleLetterTag::lowercase(Alphabet::A),
            project_a_tag.to_string(),
        )
}

/// Replies, tasks and reactions whose uppercase `E` tag names one of the
/// given threads. `None` when there are no threads to ask about.
pub fn thread_related_filter<'a, I>(thread_ids: I) -> Option<Filter>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut filter = Filter::new().kinds([
        Kind::from(kinds::GENERIC_REPLY),
        Kind::from(kinds::TASK),
        Kind::from(kinds::REACTION),
    ]);
    let mut any = false;
    for id in thread_ids {
        filter = filter.custom_tag(SingleLetterTag::uppercase(Alphabet::E), id.to_string());
        any = true;
    }
    any.then_some(filter)
}

/// The kind:31933 event behind a `31933:<pubkey>:<d>` coordinate.
pub fn project_metadata_filter(coordinate: &str) -> Option<Filter> {
    let mut parts = coordinate.splitn(3, ':');
    let kind = parts.next()?.parse::<u16>().ok()?;
    let author = PublicKey::from_hex(parts.next()?).ok()?;
    let identifier = parts.next()?;
    (kind == kinds::PROJECT).then(|| {
        Filter::new()
            .kind(Kind::from(kind))
            .author(author)
            .identifier(identifier)
    })
}

/// Resolve display names for project coordinates. Coordinates that fail to
/// parse or are not found on the relays are left out.
pub async fn load_project_names<S: EventSource>(
    source: &S,
    coordinates: &[&str],
    timeout: Duration,
) -> Result<ProjectLookup> {
    let mut lookup = ProjectLookup::new();
    for coordinate in coordinates {
        let Some(filter) = project_metadata_filter(coordinate) else {
            tracing::warn!(coordinate = %coordinate, "not a project coordinate");
            continue;
        };
        let newest = source
            .fetch(filter, timeout)
            .await?
            .into_iter()
            .max_by(|a, b| a.created_at.cmp(&b.created_at));
        if let Some(FeedItem::Project { name, .. }) = newest.as_ref().map(FeedItem::from_event) {
            lookup.insert(coordinate.to_string(), name);
        }
    }
    Ok(lookup)
}

/// Result of an initial project load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub threads: usize,
    pub related: usize,
}

/// Fetch a project's threads, then everything referencing them, into `store`.
pub async fn load_project<S: EventSource>(
    source: &S,
    store: &SharedEventStore,
    project_a_tag: &str,
    timeout: Duration,
) -> Result<LoadStats> {
    let threads = source
        .fetch(project_threads_filter(project_a_tag), timeout)
        .await?;
    let thread_ids: Vec<String> = threads
        .iter()
        .filter(|event| event.is_thread())
        .map(|event| event.id.clone())
        .collect();

    let mut stats = LoadStats {
        threads: store.write().extend(threads),
        related: 0,
    };
    tracing::info!(project = project_a_tag, threads = stats.threads, "loaded threads");

    if let Some(filter) = thread_related_filter(thread_ids.iter().map(String::as_str)) {
        let related = source.fetch(filter, timeout).await?;
        stats.related = store.write().extend(related);
        tracing::info!(project = project_a_tag, related = stats.related, "loaded replies");
    }

    Ok(stats)
}

/// Filters that keep a loaded project current: new threads plus anything
/// referencing the threads already in the store.
pub fn project_live_filters(project_a_tag: &str, store: &SharedEventStore) -> Vec<Filter> {
    let now = Timestamp::now();
    let mut filters = vec![project_threads_filter(project_a_tag).since(now)];

    let guard = store.read();
    let thread_ids = guard
        .threads()
        .filter(|thread| thread.project_ref() == Some(project_a_tag))
        .map(|thread| thread.id.as_str());
    if let Some(filter) = thread_related_filter(thread_ids) {
        filters.push(filter.since(now));
    }
    filters
}

/// Extra subscription needed after `event` arrives live: a new thread
/// brings its replies, tasks and reactions into scope.
pub fn live_follow_up_filter(event: &FeedEvent) -> Option<Filter> {
    if !event.is_thread() {
        return None;
    }
    thread_related_filter([event.id.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EventStore;

    const PROJECT: &str = "31933:owner:tenex";

    /// Answers filters by inspecting their NIP-01 JSON form.
    struct StaticSource {
        events: Vec<FeedEvent>,
    }

    impl EventSource for StaticSource {
        async fn fetch(&self, filter: Filter, _timeout: Duration) -> Result<Vec<FeedEvent>> {
            let json = serde_json::to_value(&filter).unwrap();
            let kinds: Vec<u64> = json["kinds"]
                .as_array()
                .map(|k| k.iter().filter_map(|v| v.as_u64()).collect())
                .unwrap_or_default();
            let tag_values = |key: &str| -> Vec<String> {
                json[key]
                    .as_array()
                    .map(|v| v.iter().filter_map(|s| s.as_str().map(str::to_string)).collect())
                    .unwrap_or_default()
            };
            let projects = tag_values("#a");
            let roots = tag_values("#E");

            Ok(self
                .events
                .iter()
                .filter(|e| kinds.contains(&u64::from(e.kind)))
                .filter(|e| {
                    projects.is_empty() || e.project_ref().is_some_and(|p| projects.iter().any(|x| x == p))
                })
                .filter(|e| roots.is_empty() || e.root_ref().is_some_and(|r| roots.iter().any(|x| x == r)))
                .cloned()
                .collect())
        }
    }

    #[test]
    fn test_project_threads_filter_json() {
        let json = serde_json::to_value(project_threads_filter(PROJECT)).unwrap();
        assert_eq!(json["kinds"], serde_json::json!([11]));
        assert_eq!(json["#a"], serde_json::json!([PROJECT]));
    }

    #[test]
    fn test_related_filter_uses_uppercase_e() {
        assert!(thread_related_filter(std::iter::empty()).is_none());

        let filter = thread_related_filter(["t1", "t2"]).unwrap();
        let json = serde_json::to_value(filter).unwrap();
        let mut kinds: Vec<u64> = json["kinds"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_u64())
            .collect();
        kinds.sort_unstable();
        assert_eq!(kinds, vec![7, 1111, 1934]);
        assert_eq!(json["#E"], serde_json::json!(["t1", "t2"]));
        assert!(json.get("#e").is_none());
    }

    #[test]
    fn test_project_metadata_filter() {
        let owner = Keys::generate().public_key().to_hex();
        let coordinate = format!("31933:{}:tenex", owner);
        let json = serde_json::to_value(project_metadata_filter(&coordinate).unwrap()).unwrap();
        assert_eq!(json["kinds"], serde_json::json!([31933]));
        assert_eq!(json["authors"], serde_json::json!([owner]));
        assert_eq!(json["#d"], serde_json::json!(["tenex"]));

        assert!(project_metadata_filter("31933:not-hex:tenex").is_none());
        assert!(project_metadata_filter(&format!("1:{}:tenex", owner)).is_none());
        assert!(project_metadata_filter("31933").is_none());
    }

    #[tokio::test]
    async fn test_load_project_names() {
        let source = StaticSource {
            events: vec![FeedEvent::new("p1", "owner", 31933, Some(1))
                .with_tag(["d", "tenex"])
                .with_tag(["title", "TENEX"])],
        };
        let owner = Keys::generate().public_key().to_hex();
        let coordinate = format!("31933:{}:tenex", owner);

        let names = load_project_names(&source, &[coordinate.as_str(), "bogus"], Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(names.get(&coordinate).map(String::as_str), Some("TENEX"));
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn test_load_project_fetches_threads_then_replies() {
        let source = StaticSource {
            events: vec![
                FeedEvent::new("t1", "alice", 11, Some(1)).with_tag(["a", PROJECT]),
                FeedEvent::new("t2", "alice", 11, Some(2)).with_tag(["a", "31933:x:other"]),
                FeedEvent::new("r1", "bob", 1111, Some(3)).with_tag(["E", "t1"]),
                FeedEvent::new("r2", "bob", 1111, Some(4)).with_tag(["E", "t2"]),
                FeedEvent::new("k1", "agent", 1934, Some(5)).with_tag(["E", "t1"]),
            ],
        };
        let store = EventStore::shared();

        let stats = load_project(&source, &store, PROJECT, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(stats, LoadStats { threads: 1, related: 2 });
        let guard = store.read();
        assert!(guard.contains("t1"));
        assert!(!guard.contains("t2"));
        assert!(!guard.contains("r2"));
        assert_eq!(guard.related("t1").len(), 2);
    }

    #[tokio::test]
    async fn test_load_project_without_threads_skips_reply_fetch() {
        let source = StaticSource { events: vec![] };
        let store = EventStore::shared();
        let stats = load_project(&source, &store, PROJECT, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(stats, LoadStats::default());
        assert!(store.read().is_empty());
    }

    #[tokio::test]
    async fn test_live_thread_follow_up_fetches_its_replies() {
        let live_thread = FeedEvent::new("t9", "alice", 11, Some(10)).with_tag(["a", PROJECT]);
        let source = StaticSource {
            events: vec![
                FeedEvent::new("r9", "bob", 1111, Some(11)).with_tag(["E", "t9"]),
                FeedEvent::new("k9", "agent", 1934, Some(12)).with_tag(["E", "t9"]),
                FeedEvent::new("r1", "bob", 1111, Some(13)).with_tag(["E", "t1"]),
            ],
        };

        let filter = live_follow_up_filter(&live_thread).unwrap();
        let mut ids: Vec<String> = source
            .fetch(filter, Duration::from_secs(1))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["k9", "r9"]);

        let reply = FeedEvent::new("r9", "bob", 1111, Some(11)).with_tag(["E", "t9"]);
        assert!(live_follow_up_filter(&reply).is_none());
    }

    #[test]
    fn test_live_filters_cover_known_threads() {
        let store = EventStore::shared();
        assert_eq!(project_live_filters(PROJECT, &store).len(), 1);

        store
            .write()
            .insert(FeedEvent::new("t1", "alice", 11, Some(1)).with_tag(["a", PROJECT]));
        assert_eq!(project_live_filters(PROJECT, &store).len(), 2);
    }
}
