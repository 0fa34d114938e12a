//! Load command.
//!
//! Runs a command with the environment's variables set. Provider
//! configuration keys are not passed on.

use std::process::Command;

use tracing::debug;

use crate::cli::resolve::Context;
use crate::core::sync;
use crate::error::{Error, Result};

/// Run `command` and return its exit code.
pub fn execute(env: Option<&str>, command: &[String]) -> Result<i32> {
    let Some((program, args)) = command.split_first() else {
        return Err(Error::Other("no command specified".to_string()));
    };

    let ctx = Context::current()?;
    let environment = ctx.environment(env)?;
    let files = ctx.store.read_env_files(Some(&environment))?;
    let vars = sync::load_vars(&files);
    debug!(environment = %environment, vars = vars.len(), program = %program, "spawning");

    let status = Command::new(program).args(args).envs(&vars).status()?;
    // killed by a signal: no code, report failure
    Ok(status.code().unwrap_or(1))
}
