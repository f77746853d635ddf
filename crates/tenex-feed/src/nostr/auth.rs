use nostr_sdk::nips::nip49::EncryptedSecretKey;
use nostr_sdk::prelude::*;

use crate::config::Credentials;
use crate::error::{FeedError, Result};

/// Whether the configured key is NIP-49 encrypted and needs a password.
pub fn credentials_need_password(credentials: &Credentials) -> bool {
    credentials.key.starts_with("ncryptsec")
}

/// Signing keys from an nsec, hex secret or ncryptsec (with `password`).
pub fn load_keys(credentials: &Credentials, password: Option<&str>) -> Result<Keys> {
    let secret_key = if credentials_need_password(credentials) {
        let password = password.ok_or_else(|| FeedError::InvalidKey {
            message: "Credentials are encrypted, password required".to_string(),
        })?;
        EncryptedSecretKey::from_bech32(&credentials.key)
            .map_err(invalid_key)?
            .decrypt(password)
            .map_err(invalid_key)?
    } else {
        SecretKey::parse(&credentials.key).map_err(invalid_key)?
    };
    Ok(Keys::new(secret_key))
}

fn invalid_key(err: impl std::fmt::Display) -> FeedError {
    FeedError::InvalidKey {
        message: err.to_string(),
    }
}
