//! Init command.
//!
//! Writes the provider configuration into `.env`, creates the master
//! project and makes master the current environment.

use std::io::{self, IsTerminal};

use dialoguer::{Input, Password, Select};
use tracing::info;

use crate::cli::output;
use crate::cli::resolve::Context;
use crate::core::constants::{ENV_FILE, MASTER};
use crate::core::provider::{Provider, ProviderKind, StorageClient};
use crate::core::types::EnvMap;
use crate::error::{Error, FileError, ProviderError, Result};

/// Initialize envsync in the current directory.
pub fn execute(provider: Option<&str>) -> Result<()> {
    let ctx = Context::current()?;
    let interactive = io::stdin().is_terminal();

    let mut env = match ctx.store.read(ENV_FILE) {
        Ok(env) => env,
        Err(Error::File(FileError::NotFound { .. })) => EnvMap::new(),
        Err(e) => return Err(e),
    };

    let kind = match provider {
        Some(name) => ProviderKind::parse(name)
            .ok_or_else(|| Error::Other(format!("unknown provider: {}", name)))?,
        None => match ProviderKind::detect(&env) {
            Ok(kind) => kind,
            Err(ProviderError::NoProviderMatched) if interactive => select_provider()?,
            Err(e) => return Err(e.into()),
        },
    };
    info!(provider = %kind, "initializing");

    let mut changed = false;
    for &key in kind.required_keys() {
        if env.get(key).is_some_and(|v| !v.trim().is_empty()) {
            continue;
        }
        if !interactive {
            return Err(ProviderError::MissingConfig {
                provider: kind.name(),
                key,
            }
            .into());
        }
        env.insert(key.to_string(), prompt(key, key == kind.marker_key())?);
        changed = true;
    }

    // another provider's marker left in .env would make selection ambiguous
    ProviderKind::detect(&env)?;

    if changed {
        ctx.store.write(&env, ENV_FILE)?;
        output::success(&format!("wrote {} configuration to {}", kind.display_name(), ENV_FILE));
    }

    let client = Provider::for_kind(kind, &env)?;
    match client.create_project(None) {
        Ok(project) => output::success(&format!("created {}", output::key(&project.title))),
        Err(Error::Provider(ProviderError::AlreadyExists(title))) => {
            output::warn(&format!("{} already exists, using it", title));
        }
        Err(e) => return Err(e),
    }

    ctx.environments.persist_current(MASTER)?;
    output::hint(&format!("next: {}", output::cmd("envsync push")));
    Ok(())
}

fn select_provider() -> Result<ProviderKind> {
    let names: Vec<&str> = ProviderKind::ALL.iter().map(|k| k.display_name()).collect();
    let choice = Select::new()
        .with_prompt("Provider")
        .items(&names)
        .default(0)
        .interact()?;
    Ok(ProviderKind::ALL[choice])
}

fn prompt(key: &str, hidden: bool) -> Result<String> {
    let value = if hidden {
        Password::new().with_prompt(key).interact()?
    } else {
        Input::<String>::new().with_prompt(key).interact_text()?
    };
    Ok(value.trim().to_string())
}
