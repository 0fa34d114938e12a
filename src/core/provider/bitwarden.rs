//! Bitwarden Secrets Manager, through the `bws` CLI.
//!
//! Each environment is one BWS project named after the remote project name;
//! every variable is one secret in it. `bws` has no batch update, so
//! `set_project` reconciles by secret id: one create per new secret, one edit
//! per changed secret and a single delete call for the removed ones.
//!
//! Calls run in a fixed order: creates sorted by key, then edits sorted by
//! key, then the delete. The commit is not atomic. A failed call stops the
//! run and leaves the earlier calls applied, so the project can end up
//! partially updated; deletes only run once every create and edit succeeded.
//! Pushing again converges because the next diff starts from the remote.

use std::collections::HashMap;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use super::command::Tool;
use super::{optional, require, StorageClient};
use crate::core::constants::remote_project_name;
use crate::core::domain::{Project, Secret};
use crate::core::types::EnvMap;
use crate::error::{ProviderError, Result};

const NAME: &str = "bitwarden";

const TOKEN: &str = "BWS_ACCESS_TOKEN";
const ORGANIZATION: &str = "BWS_ORGANIZATION_ID";
const PROJECT: &str = "BWS_PROJECT";
const SERVER_URL: &str = "BWS_SERVER_URL";

pub(super) const REQUIRED_KEYS: &[&str] = &[TOKEN, ORGANIZATION, PROJECT];
pub(super) const OPTIONAL_KEYS: &[&str] = &[SERVER_URL];

const BWS: Tool = Tool {
    program: "bws",
    install_url: "https://bitwarden.com/help/secrets-manager-cli/",
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BwsProject {
    id: String,
    name: String,
    #[serde(default)]
    organization_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BwsSecret {
    id: String,
    key: String,
    #[serde(default)]
    value: String,
}

/// Bitwarden Secrets Manager storage client.
#[derive(Debug, Clone)]
pub struct Bitwarden {
    token: String,
    organization_id: String,
    project: String,
    server_url: Option<String>,
}

impl Bitwarden {
    /// Configure from the `BWS_*` keys.
    pub fn from_env(env: &EnvMap) -> Result<Self> {
        Ok(Self {
            token: require(env, NAME, TOKEN)?,
            organization_id: require(env, NAME, ORGANIZATION)?,
            project: require(env, NAME, PROJECT)?,
            server_url: optional(env, SERVER_URL),
        })
    }

    fn bws(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(BWS.program);
        cmd.env(TOKEN, &self.token);
        if let Some(url) = &self.server_url {
            cmd.args(["--server-url", url]);
        }
        cmd.args(args);
        cmd.args(["--output", "json"]);
        cmd
    }

    fn run<T: for<'de> Deserialize<'de>>(&self, args: &[&str]) -> std::result::Result<T, ProviderError> {
        BWS.ensure_installed()?;
        let stdout = BWS.output(self.bws(args))?;
        parse_json(&stdout)
    }

    fn find_project(&self, name: &str) -> std::result::Result<BwsProject, ProviderError> {
        let projects: Vec<BwsProject> = self.run(&["project", "list"])?;
        select_project(projects, name, &self.organization_id)
            .ok_or_else(|| ProviderError::NotFound(format!("project '{}'", name)))
    }

    fn list_secrets(&self, project_id: &str) -> std::result::Result<Vec<BwsSecret>, ProviderError> {
        self.run(&["secret", "list", project_id])
    }
}

fn parse_json<T: for<'de> Deserialize<'de>>(json: &str) -> std::result::Result<T, ProviderError> {
    serde_json::from_str(json).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

fn select_project(projects: Vec<BwsProject>, name: &str, organization_id: &str) -> Option<BwsProject> {
    projects.into_iter().find(|p| {
        p.name == name
            && p.organization_id
                .as_deref()
                .map_or(true, |org| org == organization_id)
    })
}

fn to_project(project: BwsProject, secrets: Vec<BwsSecret>) -> Project {
    Project::new(project.id, project.name).with_secrets(
        secrets
            .into_iter()
            .map(|s| Secret::new(s.id, s.key, s.value))
            .collect(),
    )
}

/// Operations turning `current` into `desired`.
#[derive(Debug, Default, PartialEq, Eq)]
struct Reconcile<'a> {
    create: Vec<&'a Secret>,
    edit: Vec<&'a Secret>,
    delete: Vec<&'a str>,
}

fn reconcile<'a>(current: &'a Project, desired: &'a Project) -> Reconcile<'a> {
    let existing: HashMap<&str, &Secret> =
        current.secrets.iter().map(|s| (s.id.as_str(), s)).collect();

    let mut ops = Reconcile::default();
    for secret in &desired.secrets {
        match existing.get(secret.id.as_str()) {
            None => ops.create.push(secret),
            Some(old) if old.title != secret.title || old.value != secret.value => {
                ops.edit.push(secret)
            }
            Some(_) => {}
        }
    }
    ops.create.sort_by(|a, b| a.title.cmp(&b.title));
    ops.edit.sort_by(|a, b| a.title.cmp(&b.title));

    ops.delete = current
        .secrets
        .iter()
        .filter(|s| !desired.secrets.iter().any(|d| d.id == s.id))
        .map(|s| s.id.as_str())
        .collect();

    ops
}

impl StorageClient for Bitwarden {
    fn name(&self) -> &'static str {
        NAME
    }

    fn get_project(&self, environment: Option<&str>) -> Result<Project> {
        let name = remote_project_name(&self.project, environment);
        debug!(project = %name, "fetching Bitwarden project");
        let project = self.find_project(&name)?;
        let secrets = self.list_secrets(&project.id)?;
        Ok(to_project(project, secrets))
    }

    fn set_project(&self, project: &Project, environment: Option<&str>) -> Result<Project> {
        let current = self.get_project(environment)?;
        let ops = reconcile(&current, project);
        debug!(
            create = ops.create.len(),
            edit = ops.edit.len(),
            delete = ops.delete.len(),
            "reconciling Bitwarden project"
        );

        for secret in &ops.create {
            let _: BwsSecret = self.run(&[
                "secret",
                "create",
                &secret.title,
                &secret.value,
                &current.id,
            ])?;
        }
        for secret in &ops.edit {
            let _: BwsSecret = self.run(&[
                "secret",
                "edit",
                &secret.id,
                "--key",
                &secret.title,
                "--value",
                &secret.value,
            ])?;
        }
        if !ops.delete.is_empty() {
            let mut args = vec!["secret", "delete"];
            args.extend(ops.delete.iter().copied());
            BWS.output(self.bws(&args))?;
        }

        self.get_project(environment)
    }

    fn create_project(&self, environment: Option<&str>) -> Result<Project> {
        let name = remote_project_name(&self.project, environment);
        match self.find_project(&name) {
            Ok(_) => return Err(ProviderError::AlreadyExists(name).into()),
            Err(ProviderError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        debug!(project = %name, "creating Bitwarden project");
        let project: BwsProject = self.run(&["project", "create", &name])?;
        Ok(to_project(project, Vec::new()))
    }

    fn client_env_keys(&self) -> Vec<&str> {
        REQUIRED_KEYS.iter().chain(OPTIONAL_KEYS).copied().collect()
    }

    /// Secrets Manager does not store empty values.
    fn validate_secrets(&self, env: &EnvMap) -> Result<()> {
        let empty: Vec<&str> = env
            .iter()
            .filter(|(_, v)| v.is_empty())
            .map(|(k, _)| k.as_str())
            .collect();

        if empty.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::InvalidSecrets(format!(
                "Bitwarden cannot store empty values: {}",
                empty.join(", ")
            ))
            .into())
        }
    }
}
