//! Application-wide constants
//!
//! Centralized location for magic strings and configuration values
//! that are used across multiple modules.

/// Default Nostr relay URL
pub const RELAY_URL: &str = "wss://tenex.chat";

/// Default Blossom server for blob uploads
pub const BLOSSOM_SERVER: &str = "https://blossom.primal.net";

// Thread defaults
pub const DEFAULT_THREAD_TITLE: &str = "Untitled";

/// Maximum characters kept from content when deriving a title
pub const TITLE_MAX_CHARS: usize = 50;

/// Maximum characters kept for preview text
pub const PREVIEW_MAX_CHARS: usize = 140;

// Virtualized list defaults
/// Lists at or below this many rows render every row directly.
pub const VIRTUALIZATION_THRESHOLD: usize = 50;
/// Extra rows materialized above and below the viewport.
pub const DEFAULT_OVERSCAN: usize = 5;
/// Default row height in layout units.
pub const DEFAULT_ROW_HEIGHT: u32 = 72;

// Upload queue defaults
pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 3;
pub const DEFAULT_MAX_UPLOAD_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;

/// Seconds the Blossom authorization event stays valid
pub const BLOSSOM_AUTH_TTL_SECS: u64 = 300;

/// Seconds to wait for the initial batch of a relay fetch
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

// Nostr event kinds used by TENEX
pub mod kinds {
    /// Profile metadata
    pub const METADATA: u16 = 0;
    /// Reaction
    pub const REACTION: u16 = 7;
    /// Root conversation (thread)
    pub const THREAD: u16 = 11;
    /// Generic reply (NIP-22 comment)
    pub const GENERIC_REPLY: u16 = 1111;
    /// Task
    pub const TASK: u16 = 1934;
    /// Blossom upload authorization
    pub const BLOSSOM_AUTH: u16 = 24242;
    /// Project definition (NIP-33 replaceable)
    pub const PROJECT: u16 = 31933;

    /// Kinds that count as replies toward a thread's badge and participants.
    pub const REPLY_KINDS: [u16; 2] = [GENERIC_REPLY, TASK];

    pub fn is_reply_kind(kind: u16) -> bool {
        REPLY_KINDS.contains(&kind)
    }
}

// Tag names with conversation semantics
pub mod tags {
    /// Root/parent conversation reference (NIP-22 uppercase)
    pub const ROOT: &str = "E";
    /// Generic event reference, never a conversation root
    pub const REFERENCE: &str = "e";
    pub const TITLE: &str = "title";
    pub const HASHTAG: &str = "t";
    pub const PHASE: &str = "phase";
    /// Project coordinate (`31933:<pubkey>:<d>`)
    pub const PROJECT: &str = "a";
    pub const STATUS: &str = "status";
}
