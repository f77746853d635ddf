//! Conversation-list core for TENEX.
//!
//! Turns a live, unordered snapshot of Nostr events into an ordered,
//! time-filtered list of thread view-models. Relay I/O is delegated to
//! `nostr-sdk`; everything under [`store`] is pure and recomputed from the
//! current snapshot on every change.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod nostr;
pub mod store;
pub mod tracing_setup;
pub mod virtual_list;
pub mod voice;

pub use config::FeedConfig;
pub use error::{FeedError, Result};
pub use models::{FeedEvent, FeedItem, ThreadView, TimeFilter, TimeWindow};
pub use store::{EventStore, ThreadQuery};
