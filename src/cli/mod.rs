//! Command-line interface.

pub mod completions;
pub mod diff;
pub mod env;
pub mod init;
pub mod load;
pub mod output;
pub mod providers;
pub mod pull;
pub mod push;
pub mod resolve;

use clap::{Parser, Subcommand};

/// envsync - keep .env files in sync with a remote secrets vault.
#[derive(Parser)]
#[command(
    name = "envsync",
    about = "Sync .env files with 1Password, Bitwarden Secrets Manager or Contentstack Launch",
    version
)]
pub struct Cli {
    /// Environment to use instead of the current one
    #[arg(short, long, global = true)]
    pub env: Option<String>,

    /// Apply the changes instead of previewing them
    #[arg(long, global = true)]
    pub apply: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Configure a provider in .env and create the master project
    Init {
        /// Provider to configure (1password, bitwarden, contentstack)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Compare local variables with the vault, upload with --apply
    Push,

    /// Compare the vault with local variables, write with --apply
    Pull,

    /// Manage environments
    Env {
        #[command(subcommand)]
        action: EnvAction,
    },

    /// Run a command with the environment's variables
    Load {
        /// Command and arguments to run
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },

    /// List supported providers and their configuration keys
    Providers,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Environment subcommands.
#[derive(Subcommand)]
pub enum EnvAction {
    /// List environments in this directory
    List,

    /// Create .env.<name> and its remote project
    New {
        /// Environment name
        name: String,
    },

    /// Make an environment current for this directory
    Use {
        /// Environment name
        name: String,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command, returning the process exit code.
pub fn execute(cli: Cli) -> crate::error::Result<i32> {
    use Command::*;

    let env = cli.env.as_deref();
    match cli.command {
        Init { provider } => init::execute(provider.as_deref()),
        Push => push::execute(env, cli.apply),
        Pull => pull::execute(env, cli.apply),
        Env { action } => match action {
            EnvAction::List => env::list(),
            EnvAction::New { name } => env::new(&name),
            EnvAction::Use { name } => env::use_environment(&name),
        },
        Load { command } => return load::execute(env, &command),
        Providers => providers::execute(),
        Completions { shell } => completions::execute(shell),
    }?;

    Ok(0)
}
