use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::classify::partition;
use super::dedup::dedup_by_reference;
use super::replies::ReplySummary;
use super::EventStore;
use crate::models::thread::{preview_text, thread_hashtags, thread_title};
use crate::models::{FeedEvent, FeedItem, ThreadView, TimeFilter};

/// Project coordinate (`31933:<pubkey>:<d>`) -> display name.
///
/// Passed in by the caller rather than read from shared state so that
/// view computation stays a pure function of its arguments.
pub type ProjectLookup = HashMap<String, String>;

/// Everything the thread list depends on besides the event snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ThreadQuery<'a> {
    /// Restrict to threads whose `a` tag names this project
    pub project: Option<&'a str>,
    pub filter: Option<TimeFilter>,
    pub current_user: Option<&'a str>,
    pub now: u64,
    pub projects: &'a ProjectLookup,
}

impl<'a> ThreadQuery<'a> {
    pub fn new(now: u64, projects: &'a ProjectLookup) -> Self {
        Self {
            project: None,
            filter: None,
            current_user: None,
            now,
            projects,
        }
    }

    pub fn project(mut self, project: &'a str) -> Self {
        self.project = Some(project);
        self
    }

    pub fn filter(mut self, filter: Option<TimeFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn current_user(mut self, pubkey: &'a str) -> Self {
        self.current_user = Some(pubkey);
        self
    }
}

/// Ordered thread rows plus the placeholder to show when there are none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadList {
    pub threads: Vec<ThreadView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

impl ThreadList {
    fn new(threads: Vec<ThreadView>, filter: Option<TimeFilter>) -> Self {
        let empty_message = threads
            .is_empty()
            .then(|| TimeFilter::empty_state_message(filter));
        Self {
            threads,
            empty_message,
        }
    }
}

pub fn build_thread_view(
    thread: &FeedEvent,
    replies: &[&FeedEvent],
    projects: &ProjectLookup,
) -> ThreadView {
    let summary = ReplySummary::compute(thread, replies.iter().copied());

    let preview = summary
        .last_message
        .as_deref()
        .map(preview_text)
        .unwrap_or_else(|| preview_text(&thread.content));

    ThreadView {
        id: thread.id.clone(),
        pubkey: thread.pubkey.clone(),
        title: thread_title(thread),
        preview,
        reply_count: summary.reply_count,
        participant_count: summary.participant_count(),
        created_at: thread.created_at,
        last_activity: summary.last_activity(thread),
        phase: summary.phase.clone(),
        hashtags: thread_hashtags(thread),
        project: thread
            .project_ref()
            .and_then(|coordinate| projects.get(coordinate))
            .cloned(),
    }
}

/// Most recent first; unknown times last; ties by id.
pub fn sort_threads(threads: &mut [ThreadView]) {
    threads.sort_by(|a, b| {
        b.sort_time()
            .cmp(&a.sort_time())
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Aggregate, classify and sort the threads in `store` for `query`.
pub fn thread_list(store: &EventStore, query: &ThreadQuery<'_>) -> ThreadList {
    if matches!(query.filter, Some(TimeFilter::NeedsResponse(_))) && query.current_user.is_none() {
        tracing::debug!("needs-response filter without a current user; list is empty");
        return ThreadList::new(Vec::new(), query.filter);
    }

    let in_scope = store
        .threads()
        .filter(|thread| query.project.map_or(true, |p| thread.project_ref() == Some(p)));
    let (matching, _) = partition(
        in_scope,
        |id| store.related(id),
        query.filter,
        query.now,
        query.current_user,
    );

    let mut threads: Vec<ThreadView> = matching
        .into_iter()
        .map(|thread| build_thread_view(thread, &store.related(&thread.id), query.projects))
        .collect();

    sort_threads(&mut threads);

    let filter_key = query.filter.map(|f| f.key()).unwrap_or_else(|| "none".to_string());
    tracing::debug!(count = threads.len(), filter = %filter_key, "built thread list");

    ThreadList::new(threads, query.filter)
}

/// Chronological feed (newest first) of events belonging to a project:
/// events tagged with the project plus everything referencing its threads.
/// With `group_threads`, each thread contributes only its latest event.
pub fn project_feed(store: &EventStore, project: Option<&str>, group_threads: bool) -> Vec<FeedItem> {
    let project_threads: HashSet<&str> = store
        .threads()
        .filter(|thread| project.map_or(true, |p| thread.project_ref() == Some(p)))
        .map(|thread| thread.id.as_str())
        .collect();

    let in_project = |event: &FeedEvent| match project {
        None => true,
        Some(p) => {
            event.project_ref() == Some(p)
                || event
                    .root_ref()
                    .is_some_and(|root| project_threads.contains(root))
        }
    };

    let events: Vec<&FeedEvent> = store.events().filter(|e| in_project(e)).collect();
    let mut events = if group_threads {
        dedup_by_reference(events)
    } else {
        events
    };

    events.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    events.into_iter().map(FeedItem::from_event).collect()
}
