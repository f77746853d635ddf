pub mod auth;
pub mod blossom;
pub mod client;
pub mod subscriptions;
pub mod upload_queue;

pub use auth::{credentials_need_password, load_keys};
pub use blossom::{mime_type_for, BlobUploader, BlossomUploader, UploadRequest};
pub use client::RelaySource;
pub use subscriptions::{
    live_follow_up_filter, load_project, load_project_names, project_live_filters,
    project_metadata_filter, project_threads_filter, thread_related_filter, EventSource,
    LoadStats,
};
pub use upload_queue::{backoff_delay, UploadJob, UploadManager, UploadStatus};
