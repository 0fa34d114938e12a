//! Push command.

use tracing::info;

use crate::cli::diff::{render, Direction};
use crate::cli::resolve::Context;
use crate::core::provider::StorageClient;
use crate::core::sync;
use crate::error::Result;

/// Diff local variables against the vault; upload them with `apply`.
pub fn execute(env: Option<&str>, apply: bool) -> Result<()> {
    let ctx = Context::current()?;
    let environment = ctx.environment(env)?;
    let (files, provider) = ctx.open(&environment)?;
    info!(environment = %environment, provider = provider.name(), apply, "push");

    let diff = sync::push(&provider, &files, &environment, apply)?;
    render(&diff, Direction::Push, &files.env_file_name, provider.name(), apply);
    Ok(())
}
