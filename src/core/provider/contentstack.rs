//! Contentstack Launch, through its REST management API.
//!
//! A Launch project already has environments; each local environment maps
//! to the Launch environment of the same name (master maps to `Default`).
//! Variables are the environment's `environmentVariables` and their keys
//! double as secret ids. A whole variable set is committed with one `PUT`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{optional, require, StorageClient};
use crate::core::constants::remote_project_name;
use crate::core::domain::{Project, Secret};
use crate::core::types::EnvMap;
use crate::error::{ProviderError, Result};

const NAME: &str = "contentstack";

const AUTHTOKEN: &str = "CONTENTSTACK_AUTHTOKEN";
const ORGANIZATION: &str = "CONTENTSTACK_ORGANIZATION_UID";
const PROJECT: &str = "CONTENTSTACK_PROJECT_UID";
const API_URL: &str = "CONTENTSTACK_LAUNCH_API_URL";

pub(super) const REQUIRED_KEYS: &[&str] = &[AUTHTOKEN, ORGANIZATION, PROJECT];
pub(super) const OPTIONAL_KEYS: &[&str] = &[API_URL];

const DEFAULT_API_URL: &str = "https://launch-api.contentstack.com";
const DEFAULT_ENVIRONMENT: &str = "Default";
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct LaunchProject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LaunchEnvironmentList {
    #[serde(default)]
    environments: Vec<LaunchEnvironment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LaunchEnvironment {
    uid: String,
    name: String,
    #[serde(default)]
    environment_variables: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Variable {
    key: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VariablesBody {
    environment_variables: Vec<Variable>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateEnvironmentBody<'a> {
    name: &'a str,
    environment_variables: Vec<Variable>,
}

/// Contentstack Launch storage client.
pub struct Contentstack {
    authtoken: String,
    organization_uid: String,
    project_uid: String,
    api_url: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for Contentstack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contentstack")
            .field("organization_uid", &self.organization_uid)
            .field("project_uid", &self.project_uid)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl Contentstack {
    /// Configure from the `CONTENTSTACK_*` keys.
    pub fn from_env(env: &EnvMap) -> Result<Self> {
        let api_url = optional(env, API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .build();

        Ok(Self {
            authtoken: require(env, NAME, AUTHTOKEN)?,
            organization_uid: require(env, NAME, ORGANIZATION)?,
            project_uid: require(env, NAME, PROJECT)?,
            api_url: api_url.trim_end_matches('/').to_string(),
            agent: ureq::Agent::new_with_config(config),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/projects/{}{}", self.api_url, self.project_uid, path)
    }

    fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> std::result::Result<T, ProviderError> {
        let mut response = self
            .agent
            .get(&self.url(path))
            .header("authtoken", &self.authtoken)
            .header("organization_uid", &self.organization_uid)
            .call()
            .map_err(map_http_error)?;
        response.body_mut().read_json().map_err(map_http_error)
    }

    fn fetch_project(&self) -> std::result::Result<LaunchProject, ProviderError> {
        self.get("")
    }

    fn fetch_environments(&self) -> std::result::Result<Vec<LaunchEnvironment>, ProviderError> {
        self.get::<LaunchEnvironmentList>("/environments")
            .map(|list| list.environments)
    }

    /// Project metadata and environment list, fetched on two threads.
    fn fetch_all(
        &self,
    ) -> std::result::Result<(LaunchProject, Vec<LaunchEnvironment>), ProviderError> {
        let (project, environments) = std::thread::scope(|scope| {
            let project = scope.spawn(|| self.fetch_project());
            let environments = scope.spawn(|| self.fetch_environments());
            (project.join(), environments.join())
        });

        let worker_panicked = |_| ProviderError::NetworkError("request worker panicked".to_string());
        Ok((
            project.map_err(worker_panicked)??,
            environments.map_err(worker_panicked)??,
        ))
    }

    fn find_environment(
        &self,
        environment: Option<&str>,
    ) -> std::result::Result<(LaunchProject, LaunchEnvironment), ProviderError> {
        let name = launch_environment_name(environment);
        let (project, environments) = self.fetch_all()?;
        let found = environments
            .into_iter()
            .find(|e| e.name == name)
            .ok_or_else(|| ProviderError::NotFound(format!("environment '{}'", name)))?;
        Ok((project, found))
    }
}

fn launch_environment_name(environment: Option<&str>) -> &str {
    environment.unwrap_or(DEFAULT_ENVIRONMENT)
}

fn map_http_error(err: ureq::Error) -> ProviderError {
    match err {
        ureq::Error::StatusCode(401 | 403) => {
            ProviderError::AuthFailed("Contentstack rejected the authtoken".to_string())
        }
        ureq::Error::StatusCode(404) => ProviderError::NotFound("Contentstack resource".to_string()),
        ureq::Error::StatusCode(409) => {
            ProviderError::AlreadyExists("Contentstack resource".to_string())
        }
        ureq::Error::StatusCode(422) => {
            ProviderError::InvalidSecrets("Contentstack rejected the variables".to_string())
        }
        ureq::Error::StatusCode(code) => {
            ProviderError::NetworkError(format!("Contentstack returned HTTP {}", code))
        }
        ureq::Error::Json(e) => ProviderError::InvalidResponse(e.to_string()),
        other => ProviderError::NetworkError(other.to_string()),
    }
}

fn to_project(project: &LaunchProject, environment: Option<&str>, launch: LaunchEnvironment) -> Project {
    let secrets = launch
        .environment_variables
        .into_iter()
        .map(|v| Secret::new(v.key.clone(), v.key, v.value))
        .collect();

    Project::new(launch.uid, remote_project_name(&project.name, environment)).with_secrets(secrets)
}

fn to_variables(project: &Project) -> Vec<Variable> {
    project
        .secrets
        .iter()
        .map(|s| Variable {
            key: s.title.clone(),
            value: s.value.clone(),
        })
        .collect()
}

impl StorageClient for Contentstack {
    fn name(&self) -> &'static str {
        NAME
    }

    fn get_project(&self, environment: Option<&str>) -> Result<Project> {
        debug!(environment = launch_environment_name(environment), "fetching Launch environment");
        let (project, launch) = self.find_environment(environment)?;
        Ok(to_project(&project, environment, launch))
    }

    fn set_project(&self, project: &Project, environment: Option<&str>) -> Result<Project> {
        let (meta, launch) = self.find_environment(environment)?;
        let body = VariablesBody {
            environment_variables: to_variables(project),
        };

        debug!(environment = %launch.name, variables = body.environment_variables.len(), "committing Launch variables");
        let mut response = self
            .agent
            .put(&self.url(&format!("/environments/{}", launch.uid)))
            .header("authtoken", &self.authtoken)
            .header("organization_uid", &self.organization_uid)
            .send_json(&body)
            .map_err(map_http_error)?;
        let updated: LaunchEnvironment = response.body_mut().read_json().map_err(map_http_error)?;

        Ok(to_project(&meta, environment, updated))
    }

    fn create_project(&self, environment: Option<&str>) -> Result<Project> {
        let name = launch_environment_name(environment);
        let (meta, environments) = self.fetch_all()?;
        if environments.iter().any(|e| e.name == name) {
            return Err(ProviderError::AlreadyExists(format!("environment '{}'", name)).into());
        }

        debug!(environment = name, "creating Launch environment");
        let body = CreateEnvironmentBody {
            name,
            environment_variables: Vec::new(),
        };
        let mut response = self
            .agent
            .post(&self.url("/environments"))
            .header("authtoken", &self.authtoken)
            .header("organization_uid", &self.organization_uid)
            .send_json(&body)
            .map_err(map_http_error)?;
        let created: LaunchEnvironment = response.body_mut().read_json().map_err(map_http_error)?;

        Ok(to_project(&meta, environment, created))
    }

    fn client_env_keys(&self) -> Vec<&str> {
        REQUIRED_KEYS.iter().chain(OPTIONAL_KEYS).copied().collect()
    }
}
