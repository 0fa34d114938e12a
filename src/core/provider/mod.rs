//! Remote storage providers.
//!
//! Every provider is consumed through [`StorageClient`]. Which provider a
//! directory uses is decided by [`ProviderKind::detect`], a pure function of
//! the base `.env`: exactly one provider's marker key must be present.
//!
//! ## Adding a Provider
//!
//! 1. Add a variant to [`ProviderKind`] with its marker and config keys
//! 2. Implement `StorageClient` in a new file
//! 3. Add a [`Provider`] variant and wire it into the `match`es below

use std::fmt;

use crate::core::domain::Project;
use crate::core::types::EnvMap;
use crate::error::{ProviderError, Result};

mod bitwarden;
mod command;
mod contentstack;
mod memory;
mod onepassword;

pub use bitwarden::Bitwarden;
pub use contentstack::Contentstack;
pub use memory::MemoryClient;
pub use onepassword::OnePassword;

/// The operations the sync engine needs from a remote store.
///
/// `environment` is `None` for the master environment.
pub trait StorageClient {
    /// Provider name for display.
    fn name(&self) -> &'static str;

    /// Fetch the project holding `environment`'s secrets.
    ///
    /// # Errors
    ///
    /// `ProviderError::NotFound`, `AuthFailed` or `NetworkError`.
    fn get_project(&self, environment: Option<&str>) -> Result<Project>;

    /// Replace the project's secrets with `project.secrets` in one commit.
    fn set_project(&self, project: &Project, environment: Option<&str>) -> Result<Project>;

    /// Create an empty project for `environment`.
    ///
    /// # Errors
    ///
    /// `ProviderError::AlreadyExists` if it is already there.
    fn create_project(&self, environment: Option<&str>) -> Result<Project>;

    /// Variable names that configure this provider rather than the app.
    fn client_env_keys(&self) -> Vec<&str>;

    /// Provider-specific checks on a payload before it is pushed.
    fn validate_secrets(&self, _env: &EnvMap) -> Result<()> {
        Ok(())
    }
}

/// Supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OnePassword,
    Bitwarden,
    Contentstack,
}

impl ProviderKind {
    /// Every supported provider.
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::OnePassword,
        ProviderKind::Bitwarden,
        ProviderKind::Contentstack,
    ];

    /// Short name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OnePassword => "1password",
            ProviderKind::Bitwarden => "bitwarden",
            ProviderKind::Contentstack => "contentstack",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OnePassword => "1Password",
            ProviderKind::Bitwarden => "Bitwarden Secrets Manager",
            ProviderKind::Contentstack => "Contentstack Launch",
        }
    }

    /// Key whose presence in `.env` selects this provider.
    pub fn marker_key(&self) -> &'static str {
        self.required_keys()[0]
    }

    /// Keys that must be set; the first one is the marker.
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::OnePassword => onepassword::REQUIRED_KEYS,
            ProviderKind::Bitwarden => bitwarden::REQUIRED_KEYS,
            ProviderKind::Contentstack => contentstack::REQUIRED_KEYS,
        }
    }

    /// Keys that may be set.
    pub fn optional_keys(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::OnePassword => &[],
            ProviderKind::Bitwarden => bitwarden::OPTIONAL_KEYS,
            ProviderKind::Contentstack => contentstack::OPTIONAL_KEYS,
        }
    }

    /// All configuration keys of this provider.
    pub fn client_env_keys(&self) -> Vec<&'static str> {
        self.required_keys()
            .iter()
            .chain(self.optional_keys())
            .copied()
            .collect()
    }

    /// Parse a provider name (`1password`/`op`, `bitwarden`/`bws`, `contentstack`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "1password" | "onepassword" | "op" => Some(ProviderKind::OnePassword),
            "bitwarden" | "bws" => Some(ProviderKind::Bitwarden),
            "contentstack" | "launch" => Some(ProviderKind::Contentstack),
            _ => None,
        }
    }

    /// Select the provider configured in `env`.
    ///
    /// # Errors
    ///
    /// `NoProviderMatched` when no marker key is present,
    /// `MultipleProvidersMatched` when more than one is.
    pub fn detect(env: &EnvMap) -> std::result::Result<Self, ProviderError> {
        let matched: Vec<ProviderKind> = Self::ALL
            .into_iter()
            .filter(|kind| env.contains_key(kind.marker_key()))
            .collect();

        match matched.as_slice() {
            [] => Err(ProviderError::NoProviderMatched),
            [kind] => Ok(*kind),
            many => Err(ProviderError::MultipleProvidersMatched {
                providers: many
                    .iter()
                    .map(|k| k.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration keys of every provider.
pub fn all_client_env_keys() -> Vec<&'static str> {
    ProviderKind::ALL
        .iter()
        .flat_map(|kind| kind.client_env_keys())
        .collect()
}

/// Read a required key, treating blank values as missing.
pub(crate) fn require(
    env: &EnvMap,
    provider: &'static str,
    key: &'static str,
) -> std::result::Result<String, ProviderError> {
    match env.get(key).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ProviderError::MissingConfig { provider, key }),
    }
}

/// Read an optional key, treating blank values as unset.
pub(crate) fn optional(env: &EnvMap, key: &str) -> Option<String> {
    env.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A configured provider.
#[derive(Debug)]
pub enum Provider {
    OnePassword(OnePassword),
    Bitwarden(Bitwarden),
    Contentstack(Contentstack),
}

impl Provider {
    /// Detect and configure the provider from the base `.env`.
    pub fn from_env(env: &EnvMap) -> Result<Self> {
        let kind = ProviderKind::detect(env)?;
        tracing::debug!(provider = %kind, "provider selected");
        Self::for_kind(kind, env)
    }

    /// Configure a specific provider from `env`.
    pub fn for_kind(kind: ProviderKind, env: &EnvMap) -> Result<Self> {
        Ok(match kind {
            ProviderKind::OnePassword => Provider::OnePassword(OnePassword::from_env(env)?),
            ProviderKind::Bitwarden => Provider::Bitwarden(Bitwarden::from_env(env)?),
            ProviderKind::Contentstack => Provider::Contentstack(Contentstack::from_env(env)?),
        })
    }

    /// Which provider this is.
    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::OnePassword(_) => ProviderKind::OnePassword,
            Provider::Bitwarden(_) => ProviderKind::Bitwarden,
            Provider::Contentstack(_) => ProviderKind::Contentstack,
        }
    }

    fn client(&self) -> &dyn StorageClient {
        match self {
            Provider::OnePassword(p) => p,
            Provider::Bitwarden(p) => p,
            Provider::Contentstack(p) => p,
        }
    }
}

impl StorageClient for Provider {
    fn name(&self) -> &'static str {
        self.client().name()
    }

    fn get_project(&self, environment: Option<&str>) -> Result<Project> {
        self.client().get_project(environment)
    }

    fn set_project(&self, project: &Project, environment: Option<&str>) -> Result<Project> {
        self.client().set_project(project, environment)
    }

    fn create_project(&self, environment: Option<&str>) -> Result<Project> {
        self.client().create_project(environment)
    }

    fn client_env_keys(&self) -> Vec<&str> {
        self.client().client_env_keys()
    }

    fn validate_secrets(&self, env: &EnvMap) -> Result<()> {
        self.client().validate_secrets(env)
    }
}
