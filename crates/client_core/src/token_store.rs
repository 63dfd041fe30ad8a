//! Persistence for the bearer token so a session survives restarts.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use serde_json::{Map, Value};
use thiserror::Error;

/// Key the token is stored under inside the session file.
pub const TOKEN_STORAGE_KEY: &str = "token";
pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("failed to access token store '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token store '{}' is not a JSON object: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, TokenStoreError>;
    fn save(&self, token: &str) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// JSON object file holding the token under [`TOKEN_STORAGE_KEY`].
///
/// Unrelated keys written by other tools are left untouched.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, TokenStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(TokenStoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str::<Map<String, Value>>(&raw).map_err(|source| {
            TokenStoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), TokenStoreError> {
        let io_err = |source| TokenStoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let encoded = serde_json::to_vec_pretty(map).map_err(|source| TokenStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, encoded).map_err(io_err)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        let map = self.read_map()?;
        Ok(map
            .get(TOKEN_STORAGE_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string))
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        let mut map = self.read_map()?;
        map.insert(TOKEN_STORAGE_KEY.to_string(), Value::String(token.to_string()));
        self.write_map(&map)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut map = match self.read_map() {
            Ok(map) => map,
            // A corrupt file cannot hold a usable token; replace it.
            Err(TokenStoreError::Corrupt { .. }) => Map::new(),
            Err(err) => return Err(err),
        };
        if map.remove(TOKEN_STORAGE_KEY).is_none() && !map.is_empty() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

/// Process-local store, used for `--ephemeral` runs and tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }

    pub fn stored(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.stored())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/token_store_tests.rs"]
mod tests;
