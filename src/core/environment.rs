//! Environment registry.
//!
//! Names, discovery of `.env*` files and the per-directory current
//! environment.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::core::constants::{ENV_FILE, ENV_FILE_PREFIX, INVALID_NAME_CHARS, MASTER, SEPARATOR};
use crate::core::state::StateStore;
use crate::error::{EnvironmentError, Result};

/// Validate an environment name, returning it trimmed.
///
/// Checks run in a fixed order: empty, separator, invalid characters,
/// `..`. `master` is accepted here; see [`validate_new_environment_name`].
pub fn validate_environment_name(name: &str) -> std::result::Result<String, EnvironmentError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(EnvironmentError::EmptyName);
    }

    if trimmed.contains(SEPARATOR) {
        return Err(EnvironmentError::SeparatorNotAllowed(trimmed.to_string()));
    }

    let mut invalid: Vec<char> = Vec::new();
    for ch in trimmed.chars() {
        if INVALID_NAME_CHARS.contains(&ch) && !invalid.contains(&ch) {
            invalid.push(ch);
        }
    }
    if !invalid.is_empty() {
        let chars = invalid
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(EnvironmentError::InvalidCharacters {
            name: trimmed.to_string(),
            chars,
        });
    }

    if trimmed.contains("..") {
        return Err(EnvironmentError::PathTraversal(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validate a name for an environment that is about to be created.
pub fn validate_new_environment_name(
    name: &str,
) -> std::result::Result<String, EnvironmentError> {
    let name = validate_environment_name(name)?;
    if name == MASTER {
        return Err(EnvironmentError::ReservedName(name));
    }
    Ok(name)
}

/// List the environments present in `dir`.
///
/// `.env` contributes `master`; `.env.<suffix>` contributes `<suffix>` when
/// it is a valid, non-reserved name. Only regular files count. `master`
/// sorts first, the rest lexicographically.
pub fn discover_environments(dir: &Path) -> Result<Vec<String>> {
    let mut has_master = false;
    let mut names = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };

        if file_name == ENV_FILE {
            has_master = true;
        } else if let Some(suffix) = file_name.strip_prefix(ENV_FILE_PREFIX) {
            match validate_new_environment_name(suffix) {
                // a padded suffix would name a different file than the one found
                Ok(name) if name == suffix => names.push(name),
                _ => debug!(file = file_name, "ignoring env file with unusable name"),
            }
        }
    }

    names.sort();
    if has_master {
        names.insert(0, MASTER.to_string());
    }
    Ok(names)
}

/// Environments of one working directory, backed by a state store.
#[derive(Debug)]
pub struct Environments<S> {
    dir: PathBuf,
    state: S,
}

impl<S: StateStore> Environments<S> {
    /// Registry for `dir` using `state` for the current environment.
    pub fn new(dir: impl Into<PathBuf>, state: S) -> Self {
        Self {
            dir: dir.into(),
            state,
        }
    }

    /// Working directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// State store.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Environments present in the working directory.
    pub fn discover(&self) -> Result<Vec<String>> {
        discover_environments(&self.dir)
    }

    fn key(&self) -> String {
        self.dir.to_string_lossy().to_string()
    }

    /// Current environment of this directory, `master` when none is usable.
    pub fn resolve_current(&self) -> Result<String> {
        let entries = self.state.load()?;

        let current = match entries.get(&self.key()) {
            Some(Value::String(name)) => validate_environment_name(name).ok(),
            _ => None,
        };

        Ok(current.unwrap_or_else(|| MASTER.to_string()))
    }

    /// Environment to operate on: an explicit `--env` wins over stored state.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<String> {
        match explicit {
            Some(name) => Ok(validate_environment_name(name)?),
            None => self.resolve_current(),
        }
    }

    /// Remember `name` as the current environment of this directory.
    ///
    /// Other directories' entries are kept. There is no lock: a concurrent
    /// writer that loaded the document earlier overwrites this entry.
    pub fn persist_current(&self, name: &str) -> Result<()> {
        let name = validate_environment_name(name)?;
        let mut entries = self.state.load()?;
        entries.insert(self.key(), Value::String(name.clone()));
        self.state.save(&entries)?;
        debug!(dir = %self.dir.display(), environment = %name, "current environment saved");
        Ok(())
    }
}
