//! Per-user default language pairs and the saved backend list.
//!
//! The translator client never reads this store; an application loads it,
//! hands `addresses()` to the client, and saves the client's snapshot back.

use crate::config::DEFAULT_BACKEND;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Unknown direction '{0}', expected 'incoming' or 'outgoing'")]
    UnknownDirection(String),

    #[error("User name must not be empty")]
    EmptyUser,

    #[error("Source and target languages must not be empty")]
    EmptyLanguage,

    #[error("Failed to access preferences file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Preferences file {path} is not valid: {source}")]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Which side of a conversation a preference applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        }
    }
}

impl FromStr for Direction {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incoming" => Ok(Direction::Incoming),
            "outgoing" => Ok(Direction::Outgoing),
            other => Err(PreferenceError::UnknownDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPair {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredPreferences {
    addresses: Vec<String>,
    #[serde(default)]
    incoming: BTreeMap<String, UserPair>,
    #[serde(default)]
    outgoing: BTreeMap<String, UserPair>,
}

impl Default for StoredPreferences {
    fn default() -> Self {
        Self {
            addresses: vec![DEFAULT_BACKEND.to_string()],
            incoming: BTreeMap::new(),
            outgoing: BTreeMap::new(),
        }
    }
}

/// JSON-backed preference store bound to one file
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    data: StoredPreferences,
}

impl PreferenceStore {
    /// Load the store at `path`, creating it with defaults if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let store = Self {
                path,
                data: StoredPreferences::default(),
            };
            store.save()?;
            info!("Created preferences file {}", store.path.display());
            return Ok(store);
        }

        let raw = std::fs::read(&path).map_err(|source| PreferenceError::Io {
            path: path.clone(),
            source,
        })?;
        let data = serde_json::from_slice(&raw).map_err(|source| PreferenceError::Format {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path, data })
    }

    pub fn save(&self) -> Result<(), PreferenceError> {
        let raw = serde_json::to_vec_pretty(&self.data).map_err(|source| {
            PreferenceError::Format {
                path: self.path.clone(),
                source,
            }
        })?;

        std::fs::write(&self.path, raw).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved backend order
    pub fn addresses(&self) -> &[String] {
        &self.data.addresses
    }

    pub fn set_addresses(&mut self, addresses: Vec<String>) {
        self.data.addresses = addresses;
    }

    pub fn has_user(&self, direction: Direction, user: &str) -> bool {
        self.entries(direction).contains_key(user)
    }

    pub fn user_pair(&self, direction: Direction, user: &str) -> Option<&UserPair> {
        self.entries(direction).get(user)
    }

    /// Store the default pair for `user` in `direction`, replacing any previous one
    pub fn set_lang_pair(
        &mut self,
        direction: Direction,
        user: &str,
        source: &str,
        target: &str,
    ) -> Result<(), PreferenceError> {
        if user.is_empty() {
            return Err(PreferenceError::EmptyUser);
        }
        if source.is_empty() || target.is_empty() {
            return Err(PreferenceError::EmptyLanguage);
        }

        self.entries_mut(direction).insert(
            user.to_string(),
            UserPair {
                source: source.to_string(),
                target: target.to_string(),
            },
        );
        Ok(())
    }

    /// Returns whether an entry existed
    pub fn unset_lang_pair(&mut self, direction: Direction, user: &str) -> bool {
        self.entries_mut(direction).remove(user).is_some()
    }

    /// Drop `user` from both directions
    pub fn remove_user(&mut self, user: &str) {
        self.data.incoming.remove(user);
        self.data.outgoing.remove(user);
    }

    fn entries(&self, direction: Direction) -> &BTreeMap<String, UserPair> {
        match direction {
            Direction::Incoming => &self.data.incoming,
            Direction::Outgoing => &self.data.outgoing,
        }
    }

    fn entries_mut(&mut self, direction: Direction) -> &mut BTreeMap<String, UserPair> {
        match direction {
            Direction::Incoming => &mut self.data.incoming,
            Direction::Outgoing => &mut self.data.outgoing,
        }
    }
}
