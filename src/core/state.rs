//! Current-environment state.
//!
//! One JSON object shared by every working directory on the machine, mapping
//! an absolute directory path to its current environment name.
//!
//! ## Concurrency
//!
//! The document is read, modified and written back without any lock. Two
//! invocations updating different directories at the same time can lose one
//! of the updates; the last writer's view of the whole document wins. The
//! state only changes on interactive `env use` / `init`, so this is accepted.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::constants::{STATE_DIR, STATE_DIR_ENV, STATE_FILE};
use crate::core::fs;
use crate::error::{Result, StateError};

/// Raw state document.
pub type StateEntries = Map<String, Value>;

/// Storage for the state document.
pub trait StateStore {
    /// Load the document. Missing or corrupt storage yields an empty map.
    fn load(&self) -> Result<StateEntries>;

    /// Replace the whole document.
    fn save(&self, entries: &StateEntries) -> Result<()>;
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn load(&self) -> Result<StateEntries> {
        (**self).load()
    }

    fn save(&self, entries: &StateEntries) -> Result<()> {
        (**self).save(entries)
    }
}

/// State kept in a JSON file on disk.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// State file at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// State file at the platform location.
    ///
    /// `ENVSYNC_STATE_DIR` wins, then the per-user state directory, then the
    /// local data directory (platforms without a state directory).
    pub fn default_location() -> Result<Self> {
        let base = match std::env::var_os(STATE_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .map(|dir| dir.join(STATE_DIR))
                .ok_or(StateError::NoStateDir)?,
        };
        Ok(Self::new(base.join(STATE_FILE)))
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for StateFile {
    fn load(&self) -> Result<StateEntries> {
        debug!(path = %self.path.display(), "loading state");
        fs::read_json_object(&self.path).map_err(|source| {
            StateError::Read {
                path: self.path.clone(),
                source,
            }
            .into()
        })
    }

    fn save(&self, entries: &StateEntries) -> Result<()> {
        debug!(path = %self.path.display(), entries = entries.len(), "saving state");
        fs::write_json(&self.path, &Value::Object(entries.clone())).map_err(|source| {
            StateError::Write {
                path: self.path.clone(),
                source,
            }
            .into()
        })
    }
}

/// In-memory state. Clones share the same document.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    entries: Arc<Mutex<StateEntries>>,
}

impl MemoryState {
    /// Set one raw entry.
    pub fn insert(&self, key: &str, value: Value) {
        self.lock().insert(key.to_string(), value);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StateEntries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateStore for MemoryState {
    fn load(&self) -> Result<StateEntries> {
        Ok(self.lock().clone())
    }

    fn save(&self, entries: &StateEntries) -> Result<()> {
        *self.lock() = entries.clone();
        Ok(())
    }
}
