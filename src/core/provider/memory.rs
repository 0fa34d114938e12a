//! In-memory storage client.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::StorageClient;
use crate::core::constants::{remote_project_name, MASTER};
use crate::core::domain::{Project, Secret};
use crate::core::types::EnvMap;
use crate::error::{ProviderError, Result};

/// A storage client holding projects in memory, keyed by environment.
///
/// Counts `set_project` calls so callers can check that a sync commits once.
#[derive(Debug, Default)]
pub struct MemoryClient {
    projects: Mutex<BTreeMap<String, Project>>,
    client_keys: Vec<String>,
    reject_empty: bool,
    commits: AtomicUsize,
}

impl MemoryClient {
    /// Empty store whose configuration keys are `client_keys`.
    pub fn new(client_keys: &[&str]) -> Self {
        Self {
            client_keys: client_keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Reject empty values on push, like Bitwarden does.
    pub fn rejecting_empty_values(mut self) -> Self {
        self.reject_empty = true;
        self
    }

    /// Seed a project for `environment` with the given variables.
    pub fn with_project(self, environment: Option<&str>, vars: &[(&str, &str)]) -> Self {
        let secrets = vars
            .iter()
            .map(|(title, value)| Secret::generate(*title, *value))
            .collect();
        let project = Project::new(uuid::Uuid::new_v4().simple().to_string(), remote_project_name("memory", environment))
            .with_secrets(secrets);
        self.lock().insert(slot(environment), project);
        self
    }

    /// Current contents of `environment`'s project.
    pub fn project(&self, environment: Option<&str>) -> Option<Project> {
        self.lock().get(&slot(environment)).cloned()
    }

    /// Number of `set_project` calls so far.
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Project>> {
        self.projects.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn slot(environment: Option<&str>) -> String {
    environment.unwrap_or(MASTER).to_string()
}

impl StorageClient for MemoryClient {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get_project(&self, environment: Option<&str>) -> Result<Project> {
        self.project(environment).ok_or_else(|| {
            ProviderError::NotFound(remote_project_name("memory", environment)).into()
        })
    }

    fn set_project(&self, project: &Project, environment: Option<&str>) -> Result<Project> {
        let mut projects = self.lock();
        let key = slot(environment);
        if !projects.contains_key(&key) {
            return Err(ProviderError::NotFound(remote_project_name("memory", environment)).into());
        }
        projects.insert(key, project.clone());
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(project.clone())
    }

    fn create_project(&self, environment: Option<&str>) -> Result<Project> {
        let mut projects = self.lock();
        let key = slot(environment);
        let title = remote_project_name("memory", environment);
        if projects.contains_key(&key) {
            return Err(ProviderError::AlreadyExists(title).into());
        }
        let project = Project::new(uuid::Uuid::new_v4().simple().to_string(), title);
        projects.insert(key, project.clone());
        Ok(project)
    }

    fn client_env_keys(&self) -> Vec<&str> {
        self.client_keys.iter().map(String::as_str).collect()
    }

    fn validate_secrets(&self, env: &EnvMap) -> Result<()> {
        if self.reject_empty {
            if let Some((key, _)) = env.iter().find(|(_, v)| v.is_empty()) {
                return Err(ProviderError::InvalidSecrets(format!("empty value for {}", key)).into());
            }
        }
        Ok(())
    }
}
