//! Error types for envsync.
//!
//! Each concern gets its own error enum; [`Error`] wraps them so callers can
//! propagate everything with `?` and the binary can render a hint.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Human suggestion rendered under the error message, if any.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::File(FileError::NotFound { path }) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                if name == ".env" {
                    Some("run: envsync init".to_string())
                } else {
                    Some(format!("create it with: envsync env new {}", env_suffix(&name)))
                }
            }
            Error::File(FileError::SymlinkRejected { .. }) => {
                Some("replace the symlink with a regular file".to_string())
            }
            Error::File(FileError::ParseFailed { .. }) => {
                Some("check the file uses KEY=VALUE lines".to_string())
            }
            Error::Environment(EnvironmentError::Unknown(_)) => {
                Some("run: envsync env list".to_string())
            }
            Error::Environment(EnvironmentError::ReservedName(_)) => {
                Some("\"master\" always refers to the base .env file".to_string())
            }
            Error::Provider(ProviderError::NoProviderMatched) => {
                Some("run: envsync providers".to_string())
            }
            Error::Provider(ProviderError::MultipleProvidersMatched { .. }) => {
                Some("keep only one provider's configuration in .env".to_string())
            }
            Error::Provider(ProviderError::MissingConfig { key, .. }) => {
                Some(format!("add {} to .env", key))
            }
            Error::Provider(ProviderError::NotInstalled { tool, url }) => {
                Some(format!("install `{}`: {}", tool, url))
            }
            Error::Provider(ProviderError::NotFound(_)) => {
                Some("create it with: envsync init (or envsync env new <name>)".to_string())
            }
            _ => None,
        }
    }
}

fn env_suffix(file_name: &str) -> &str {
    file_name.strip_prefix(".env.").unwrap_or(file_name)
}

/// Environment file store errors.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("path escapes the working directory: {}", path.display())]
    PathEscape { path: PathBuf },

    #[error("refusing to follow symlink: {}", path.display())]
    SymlinkRejected { path: PathBuf },

    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to parse {}: {reason}", path.display())]
    ParseFailed { path: PathBuf, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Environment name and registry errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("environment name cannot be empty")]
    EmptyName,

    #[error("environment name '{0}' cannot contain '::'")]
    SeparatorNotAllowed(String),

    #[error("environment name '{name}' contains invalid characters: {chars}")]
    InvalidCharacters { name: String, chars: String },

    #[error("environment name '{0}' cannot contain '..'")]
    PathTraversal(String),

    #[error("environment name '{0}' is reserved")]
    ReservedName(String),

    #[error("environment '{0}' does not exist")]
    Unknown(String),

    #[error("environment '{0}' already exists")]
    AlreadyExists(String),
}

/// Current-environment state file errors.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("unable to determine a state directory")]
    NoStateDir,

    #[error("failed to read state file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write state file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Provider selection and remote adapter errors.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("no provider configuration found in .env")]
    NoProviderMatched,

    #[error("multiple providers configured in .env: {providers}")]
    MultipleProvidersMatched { providers: String },

    #[error("{provider}: missing required key {key}")]
    MissingConfig { provider: &'static str, key: &'static str },

    #[error("`{tool}` is not installed")]
    NotInstalled { tool: &'static str, url: &'static str },

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("remote project not found: {0}")]
    NotFound(String),

    #[error("remote project already exists: {0}")]
    AlreadyExists(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("invalid secrets: {0}")]
    InvalidSecrets(String),

    #[error("provider command failed: {0}")]
    CommandFailed(String),

    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
}

/// Result alias used throughout envsync.
pub type Result<T> = std::result::Result<T, Error>;
