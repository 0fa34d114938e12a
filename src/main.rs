//! envsync - keep `.env` files in sync with a remote secrets vault.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use envsync::cli::output;
use envsync::cli::{execute, Cli};
use envsync::core::constants::LOG_ENV;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("envsync=debug")
        } else {
            EnvFilter::new("envsync=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    match execute(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output::error(&e.to_string());
            if let Some(hint) = e.suggestion() {
                output::hint(&hint);
            }
            std::process::exit(1);
        }
    }
}
