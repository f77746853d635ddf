pub mod classify;
pub mod dedup;
pub mod event_store;
pub mod replies;
pub mod views;

pub use classify::{partition, ThreadActivity};
pub use dedup::dedup_by_reference;
pub use event_store::{EventStore, SharedEventStore};
pub use replies::ReplySummary;
pub use views::{
    build_thread_view, project_feed, sort_threads, thread_list, ProjectLookup, ThreadList,
    ThreadQuery,
};
