//! Environment commands: list, new, use.

use crate::cli::output;
use crate::cli::resolve::Context;
use crate::core::environment::validate_environment_name;
use crate::core::provider::Provider;
use crate::core::sync;
use crate::error::{EnvironmentError, Result};

/// List environments, marking the current one.
pub fn list() -> Result<()> {
    let ctx = Context::current()?;
    let names = ctx.environments.discover()?;

    if names.is_empty() {
        output::dimmed("no environments found");
        output::hint("run: envsync init");
        return Ok(());
    }

    let current = ctx.environments.resolve_current()?;
    for name in names {
        if name == current {
            println!("* {}", output::key(&name));
        } else {
            println!("  {}", name);
        }
    }
    Ok(())
}

/// Create `.env.<name>` and the matching remote project.
pub fn new(name: &str) -> Result<()> {
    let ctx = Context::current()?;
    let base = ctx.store.read_env_files(None)?;
    let provider = Provider::from_env(&base.env_map)?;

    let name = sync::create_environment(&provider, &ctx.store, name)?;

    output::success(&format!("created environment {}", output::key(&name)));
    output::hint(&format!("switch to it with: envsync env use {}", name));
    Ok(())
}

/// Make `name` the current environment of this directory.
pub fn use_environment(name: &str) -> Result<()> {
    let ctx = Context::current()?;
    let name = validate_environment_name(name)?;

    if !ctx.environments.discover()?.contains(&name) {
        return Err(EnvironmentError::Unknown(name).into());
    }

    ctx.environments.persist_current(&name)?;
    output::success(&format!("now using {}", output::key(&name)));
    Ok(())
}
