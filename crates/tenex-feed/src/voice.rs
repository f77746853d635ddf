//! Text-to-speech voice assignment for agents.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

const PROFILES_FILE: &str = "voice_profiles.json";

/// Assign `voice` to any agent whose name contains `pattern` (case-insensitive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRule {
    pub pattern: String,
    pub voice: String,
}

/// Persisted voice settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceProfiles {
    /// Voice ids available for hash-based assignment
    pub voices: Vec<String>,
    /// Agent pubkey -> voice id
    pub overrides: BTreeMap<String, String>,
    /// Checked in order; first match wins
    pub rules: Vec<NameRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentSource {
    Override,
    Rule,
    Hash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceAssignment {
    pub voice: String,
    pub source: AssignmentSource,
}

/// Deterministic voice for `agent_pubkey` from `voice_ids`, stable under
/// reordering of the pool. `None` when the pool is empty.
pub fn select_voice_for_agent(agent_pubkey: &str, voice_ids: &[String]) -> Option<String> {
    if voice_ids.is_empty() {
        return None;
    }

    let mut sorted_voices = voice_ids.to_vec();
    sorted_voices.sort();

    let hash = Sha256::digest(agent_pubkey.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash[..8]);
    let index = u64::from_be_bytes(prefix) % sorted_voices.len() as u64;

    sorted_voices.into_iter().nth(index as usize)
}

impl VoiceProfiles {
    pub fn assign(&self, agent_pubkey: &str, agent_name: &str) -> Option<VoiceAssignment> {
        if let Some(voice) = self.overrides.get(agent_pubkey) {
            return Some(VoiceAssignment {
                voice: voice.clone(),
                source: AssignmentSource::Override,
            });
        }

        let name = agent_name.to_lowercase();
        let rule = self
            .rules
            .iter()
            .find(|rule| !rule.pattern.is_empty() && name.contains(&rule.pattern.to_lowercase()));
        if let Some(rule) = rule {
            return Some(VoiceAssignment {
                voice: rule.voice.clone(),
                source: AssignmentSource::Rule,
            });
        }

        select_voice_for_agent(agent_pubkey, &self.voices).map(|voice| VoiceAssignment {
            voice,
            source: AssignmentSource::Hash,
        })
    }
}

/// Voice profiles backed by `voice_profiles.json` in the data directory.
/// Every mutation is written through.
pub struct VoiceProfileManager {
    path: PathBuf,
    profiles: VoiceProfiles,
}

impl VoiceProfileManager {
    /// Load from `data_dir`. A missing or unreadable file starts empty.
    pub fn new(data_dir: &Path) -> Self {
        let path = data_dir.join(PROFILES_FILE);
        let profiles = Self::load_from_file(&path).unwrap_or_default();
        Self { path, profiles }
    }

    fn load_from_file(path: &Path) -> Option<VoiceProfiles> {
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(profiles) => Some(profiles),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable voice profiles");
                None
            }
        }
    }

    fn save_to_file(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.profiles)?)?;
        Ok(())
    }

    pub fn profiles(&self) -> &VoiceProfiles {
        &self.profiles
    }

    pub fn assign(&self, agent_pubkey: &str, agent_name: &str) -> Option<VoiceAssignment> {
        self.profiles.assign(agent_pubkey, agent_name)
    }

    pub fn set_voices(&mut self, voices: Vec<String>) -> Result<()> {
        self.profiles.voices = voices;
        self.save_to_file()
    }

    pub fn set_override(&mut self, agent_pubkey: &str, voice: &str) -> Result<()> {
        self.profiles
            .overrides
            .insert(agent_pubkey.to_string(), voice.to_string());
        self.save_to_file()
    }

    /// Returns whether an override existed.
    pub fn clear_override(&mut self, agent_pubkey: &str) -> Result<bool> {
        let removed = self.profiles.overrides.remove(agent_pubkey).is_some();
        if removed {
            self.save_to_file()?;
        }
        Ok(removed)
    }

    pub fn add_rule(&mut self, pattern: &str, voice: &str) -> Result<()> {
        self.profiles.rules.push(NameRule {
            pattern: pattern.to_string(),
            voice: voice.to_string(),
        });
        self.save_to_file()
    }
}
