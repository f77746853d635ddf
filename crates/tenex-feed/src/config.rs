use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{
    BLOSSOM_SERVER, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_UPLOADS,
    DEFAULT_MAX_UPLOAD_RETRIES, DEFAULT_OVERSCAN, DEFAULT_RETRY_BASE_DELAY_MS,
    DEFAULT_ROW_HEIGHT, RELAY_URL, VIRTUALIZATION_THRESHOLD,
};

/// Feed configuration, loadable from a camelCase JSON file.
/// Every field is optional in the file and falls back to its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedConfig {
    pub data_dir: PathBuf,
    pub relays: Vec<String>,
    pub blossom_server: String,
    pub fetch_timeout_secs: u64,
    pub upload: UploadConfig,
    pub list: ListConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadConfig {
    pub max_concurrent: usize,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl UploadConfig {
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT_UPLOADS,
            max_retries: DEFAULT_MAX_UPLOAD_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

/// Virtualized list tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListConfig {
    pub virtualization_threshold: usize,
    pub overscan: usize,
    pub row_height: u32,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            virtualization_threshold: VIRTUALIZATION_THRESHOLD,
            overscan: DEFAULT_OVERSCAN,
            row_height: DEFAULT_ROW_HEIGHT,
        }
    }
}

/// Nostr credentials configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// nsec or hex secret key
    pub key: String,
}

impl FeedConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// `~/.tenex-feed`, or `./tenex_data` when there is no home directory.
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(".tenex-feed"))
            .unwrap_or_else(|| PathBuf::from("tenex_data"))
    }

    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize config")
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            relays: vec![RELAY_URL.to_string()],
            blossom_server: BLOSSOM_SERVER.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            upload: UploadConfig::default(),
            list: ListConfig::default(),
            credentials: None,
        }
    }
}
