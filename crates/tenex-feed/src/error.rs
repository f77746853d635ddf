/// Errors raised at the fallible edges of the feed core (relay I/O,
/// uploads, persistence). Aggregation and classification never fail.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Invalid key: {message}")]
    InvalidKey { message: String },
    #[error("Relay error: {message}")]
    Relay { message: String },
    #[error("Upload failed: {message}")]
    Upload { message: String },
    #[error("Unknown upload job: {id}")]
    UnknownJob { id: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeedError {
    pub fn relay(err: impl std::fmt::Display) -> Self {
        Self::Relay {
            message: err.to_string(),
        }
    }

    pub fn upload(err: impl std::fmt::Display) -> Self {
        Self::Upload {
            message: err.to_string(),
        }
    }
}

pub type Result<T, E = FeedError> = std::result::Result<T, E>;
