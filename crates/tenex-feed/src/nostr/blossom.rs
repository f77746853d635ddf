//! Blossom blob upload
//!
//! Blossom is a protocol for storing blobs on Nostr.
//! See: https://github.com/hzrd149/blossom

use std::future::Future;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use nostr_sdk::{Event, EventBuilder, Keys, Kind, Tag, TagKind, Timestamp};
use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::constants::{kinds, BLOSSOM_AUTH_TTL_SECS};
use crate::error::{FeedError, Result};

/// A blob waiting to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub mime_type: String,
    /// Display name for status reporting
    pub name: String,
}

/// Destination for blobs. Implemented by [`BlossomUploader`]; tests
/// substitute an in-memory uploader.
pub trait BlobUploader: Send + Sync + 'static {
    /// Upload one blob and return its public URL.
    fn upload(&self, request: &UploadRequest) -> impl Future<Output = Result<String>> + Send;
}

pub struct BlossomUploader {
    server: String,
    keys: Keys,
    http: Client,
}

impl BlossomUploader {
    pub fn new(server: impl Into<String>, keys: Keys) -> Self {
        Self {
            server: server.into().trim_end_matches('/').to_string(),
            keys,
            http: Client::new(),
        }
    }
}

/// Content type sent with an upload, by file extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Hex SHA-256 of a blob, as Blossom addresses it.
pub fn blob_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Signed kind:24242 upload authorization for `hash_hex`, valid for five minutes.
pub fn authorization_event(keys: &Keys, hash_hex: &str, now: u64) -> Result<Event> {
    let expiration = now + BLOSSOM_AUTH_TTL_SECS;
    EventBuilder::new(Kind::from(kinds::BLOSSOM_AUTH), "Upload")
        .tag(Tag::custom(TagKind::custom("t"), ["upload"]))
        .tag(Tag::custom(TagKind::custom("x"), [hash_hex]))
        .tag(Tag::expiration(Timestamp::from(expiration)))
        .sign_with_keys(keys)
        .map_err(|e| FeedError::InvalidKey {
            message: e.to_string(),
        })
}

/// `Authorization` header value for an authorization event.
pub fn authorization_header(event: &Event) -> Result<String> {
    let json = serde_json::to_string(event)?;
    Ok(format!("Nostr {}", BASE64.encode(json)))
}

#[derive(serde::Deserialize)]
struct BlobDescriptor {
    url: String,
}

impl BlobUploader for BlossomUploader {
    async fn upload(&self, request: &UploadRequest) -> Result<String> {
        let hash_hex = blob_hash(&request.data);
        let auth_event = authorization_event(&self.keys, &hash_hex, Timestamp::now().as_u64())?;
        let authorization = authorization_header(&auth_event)?;

        let response = self
            .http
            .put(format!("{}/upload", self.server))
            .header("Authorization", authorization)
            .header("Content-Type", request.mime_type.as_str())
            .body(request.data.clone())
            .send()
            .await
            .map_err(FeedError::upload)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Upload {
                message: format!("Blossom upload failed: {} - {}", status, body),
            });
        }

        let descriptor: BlobDescriptor = response.json().await.map_err(FeedError::upload)?;
        Ok(descriptor.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_hash_is_sha256_hex() {
        assert_eq!(
            blob_hash(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for(Path::new("shot.PNG")), "image/png");
        assert_eq!(mime_type_for(Path::new("a/b/clip.jpeg")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("notes")), "application/octet-stream");
    }

    #[test]
    fn test_authorization_event_tags() {
        let keys = Keys::generate();
        let event = authorization_event(&keys, "abc123", 1_000).unwrap();

        assert_eq!(event.kind.as_u16(), 24242);
        let tags: Vec<Vec<String>> = event.tags.iter().map(|t| t.as_slice().to_vec()).collect();
        assert!(tags.contains(&vec!["t".to_string(), "upload".to_string()]));
        assert!(tags.contains(&vec!["x".to_string(), "abc123".to_string()]));
        assert!(tags.contains(&vec!["expiration".to_string(), "1300".to_string()]));
    }

    #[test]
    fn test_authorization_header_roundtrips_event_json() {
        let keys = Keys::generate();
        let event = authorization_event(&keys, "abc123", 1_000).unwrap();
        let header = authorization_header(&event).unwrap();

        let encoded = header.strip_prefix("Nostr ").unwrap();
        let decoded = BASE64.decode(encoded).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(parsed["id"], event.id.to_hex());
        assert_eq!(parsed["kind"], 24242);
    }
}
