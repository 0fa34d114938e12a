//! 1Password, through the `op` CLI.
//!
//! Each environment is one Secure Note item titled after the remote project
//! name (`app` for master, `app::dev` otherwise). Every variable is a
//! concealed field labelled with the variable name. Writes go through a
//! single `op item edit --template` so the whole item is replaced at once.

use std::io::Write;
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::command::Tool;
use super::{require, StorageClient};
use crate::core::constants::remote_project_name;
use crate::core::domain::{Project, Secret};
use crate::error::{ProviderError, Result};
use crate::core::types::EnvMap;

const NAME: &str = "1password";

const TOKEN: &str = "OP_SERVICE_ACCOUNT_TOKEN";
const VAULT: &str = "OP_VAULT";
const PROJECT: &str = "OP_PROJECT";

pub(super) const REQUIRED_KEYS: &[&str] = &[TOKEN, VAULT, PROJECT];

const OP: Tool = Tool {
    program: "op",
    install_url: "https://developer.1password.com/docs/cli/get-started/",
};

// Built-in fields of a Secure Note that are not variables.
const NOTES_FIELD: &str = "notesPlain";

#[derive(Debug, Deserialize)]
struct OpItem {
    id: String,
    title: String,
    #[serde(default)]
    fields: Vec<OpField>,
}

#[derive(Debug, Deserialize)]
struct OpField {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    purpose: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpItemTemplate<'a> {
    title: &'a str,
    category: &'static str,
    fields: Vec<OpFieldTemplate<'a>>,
}

#[derive(Debug, Serialize)]
struct OpFieldTemplate<'a> {
    id: &'a str,
    label: &'a str,
    #[serde(rename = "type")]
    field_type: &'static str,
    value: &'a str,
}

/// 1Password storage client.
#[derive(Debug, Clone)]
pub struct OnePassword {
    token: String,
    vault: String,
    project: String,
}

impl OnePassword {
    /// Configure from `OP_SERVICE_ACCOUNT_TOKEN`, `OP_VAULT` and `OP_PROJECT`.
    pub fn from_env(env: &EnvMap) -> Result<Self> {
        Ok(Self {
            token: require(env, NAME, TOKEN)?,
            vault: require(env, NAME, VAULT)?,
            project: require(env, NAME, PROJECT)?,
        })
    }

    fn item_title(&self, environment: Option<&str>) -> String {
        remote_project_name(&self.project, environment)
    }

    fn op(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(OP.program);
        cmd.env(TOKEN, &self.token);
        cmd.args(args);
        cmd.args(["--vault", &self.vault, "--format", "json"]);
        cmd
    }

    fn run(&self, args: &[&str]) -> std::result::Result<OpItem, ProviderError> {
        OP.ensure_installed()?;
        let stdout = OP.output(self.op(args))?;
        parse_item(&stdout)
    }
}

fn parse_item(json: &str) -> std::result::Result<OpItem, ProviderError> {
    serde_json::from_str(json).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

fn item_to_project(item: OpItem) -> Project {
    let secrets = item
        .fields
        .into_iter()
        .filter(|f| f.purpose.is_none() && f.id != NOTES_FIELD)
        .filter_map(|f| {
            let label = f.label.filter(|l| !l.is_empty())?;
            Some(Secret::new(f.id, label, f.value.unwrap_or_default()))
        })
        .collect();

    Project::new(item.id, item.title).with_secrets(secrets)
}

fn item_template<'a>(title: &'a str, project: &'a Project) -> OpItemTemplate<'a> {
    OpItemTemplate {
        title,
        category: "SECURE_NOTE",
        fields: project
            .secrets
            .iter()
            .map(|s| OpFieldTemplate {
                id: &s.id,
                label: &s.title,
                field_type: "CONCEALED",
                value: &s.value,
            })
            .collect(),
    }
}

impl StorageClient for OnePassword {
    fn name(&self) -> &'static str {
        NAME
    }

    fn get_project(&self, environment: Option<&str>) -> Result<Project> {
        let title = self.item_title(environment);
        debug!(item = %title, "fetching 1Password item");
        let item = self.run(&["item", "get", &title])?;
        Ok(item_to_project(item))
    }

    fn set_project(&self, project: &Project, environment: Option<&str>) -> Result<Project> {
        let title = self.item_title(environment);
        let template = serde_json::to_string(&item_template(&title, project))?;

        // tempfile creates the file 0600
        let mut file = tempfile::Builder::new()
            .prefix("envsync-op-")
            .suffix(".json")
            .tempfile()?;
        file.write_all(template.as_bytes())?;
        file.flush()?;

        let template_path = file.path().to_string_lossy().to_string();
        debug!(item = %title, secrets = project.len(), "committing 1Password item");
        let item = self.run(&["item", "edit", &project.id, "--template", &template_path])?;
        Ok(item_to_project(item))
    }

    fn create_project(&self, environment: Option<&str>) -> Result<Project> {
        let title = self.item_title(environment);
        match self.get_project(environment) {
            Ok(_) => return Err(ProviderError::AlreadyExists(title).into()),
            Err(crate::error::Error::Provider(ProviderError::NotFound(_))) => {}
            Err(e) => return Err(e),
        }

        debug!(item = %title, "creating 1Password item");
        let item = self.run(&[
            "item",
            "create",
            "--category",
            "Secure Note",
            "--title",
            &title,
        ])?;
        Ok(item_to_project(item))
    }

    fn client_env_keys(&self) -> Vec<&str> {
        REQUIRED_KEYS.to_vec()
    }
}
