pub mod event;
pub mod feed_item;
pub mod tag_utils;
pub mod thread;
pub mod time_filter;

pub use event::FeedEvent;
pub use feed_item::FeedItem;
pub use thread::ThreadView;
pub use time_filter::{TimeFilter, TimeWindow};
