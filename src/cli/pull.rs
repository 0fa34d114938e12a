//! Pull command.

use tracing::info;

use crate::cli::diff::{render, Direction};
use crate::cli::resolve::Context;
use crate::core::provider::StorageClient;
use crate::core::sync;
use crate::error::Result;

/// Diff the vault against local variables; write them with `apply`.
pub fn execute(env: Option<&str>, apply: bool) -> Result<()> {
    let ctx = Context::current()?;
    let environment = ctx.environment(env)?;
    let (files, provider) = ctx.open(&environment)?;
    info!(environment = %environment, provider = provider.name(), apply, "pull");

    let diff = sync::pull(&provider, &ctx.store, &files, &environment, apply)?;
    render(&diff, Direction::Pull, &files.env_file_name, provider.name(), apply);
    Ok(())
}
