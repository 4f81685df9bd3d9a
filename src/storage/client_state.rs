// src/storage/client_state.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::UserProfile;

pub const CURRENT_USER_KEY: &str = "currentUser";
pub const USER_EMAIL_KEY: &str = "userEmail";

#[derive(Debug, thiserror::Error)]
pub enum ClientStateError {
    #[error("client state {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("client state {} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value state kept on the client between runs, stored as one
/// JSON object.
pub struct ClientState {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl ClientState {
    /// Opens the state file; a missing file is an empty state.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientStateError> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| ClientStateError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(ClientStateError::Io { path, source }),
        };
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    /// Writes `currentUser` and `userEmail` for a fresh login.
    pub fn record_login(&mut self, user: &UserProfile) -> Result<(), ClientStateError> {
        let blob = serde_json::to_string(user).map_err(|source| ClientStateError::Json {
            path: self.path.clone(),
            source,
        })?;
        self.items.insert(CURRENT_USER_KEY.to_string(), blob);
        self.items.insert(USER_EMAIL_KEY.to_string(), user.email.clone());
        self.flush()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        let blob = self.get_item(CURRENT_USER_KEY)?;
        match serde_json::from_str(blob) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Ignoring unreadable {}: {}", CURRENT_USER_KEY, e);
                None
            }
        }
    }

    fn flush(&self) -> Result<(), ClientStateError> {
        let io_err = |source| ClientStateError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.items).map_err(|source| {
            ClientStateError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, raw).map_err(io_err)
    }
}
