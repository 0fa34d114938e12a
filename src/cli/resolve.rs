//! Working-directory context for CLI commands.

use crate::core::envfile::{EnvFileStore, EnvFiles};
use crate::core::environment::Environments;
use crate::core::provider::Provider;
use crate::core::state::StateFile;
use crate::error::Result;

/// Env files and environments of the current directory.
pub struct Context {
    pub store: EnvFileStore,
    pub environments: Environments<StateFile>,
}

impl Context {
    /// Context for the process working directory and the default state file.
    pub fn current() -> Result<Self> {
        let store = EnvFileStore::current()?;
        let environments = Environments::new(store.root(), StateFile::default_location()?);
        Ok(Self {
            store,
            environments,
        })
    }

    /// Environment to operate on: `--env` if given, else the current one.
    pub fn environment(&self, explicit: Option<&str>) -> Result<String> {
        self.environments.resolve(explicit)
    }

    /// Load env files for `environment` and select the provider from `.env`.
    pub fn open(&self, environment: &str) -> Result<(EnvFiles, Provider)> {
        let files = self.store.read_env_files(Some(environment))?;
        let provider = Provider::from_env(&files.env_map)?;
        Ok((files, provider))
    }
}
