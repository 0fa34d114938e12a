//! envsync - keep `.env` files in sync with a remote secrets vault.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Configure a provider and create the master project
//! │   ├── push / pull   # Diff preview, commit with --apply
//! │   ├── env           # list / new / use environments
//! │   ├── load          # Run a command with the merged variables
//! │   ├── providers     # Supported providers and their keys
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── envfile       # .env parsing and guarded file access
//!     ├── environment   # Environment names and discovery
//!     ├── state         # Per-directory current environment
//!     ├── diff          # Push and pull change sets
//!     ├── provider/     # Storage clients
//!     │   ├── mod       # StorageClient trait, provider selection
//!     │   ├── onepassword
//!     │   ├── bitwarden
//!     │   ├── contentstack
//!     │   └── memory    # In-memory client
//!     └── sync          # Push, pull and apply
//! ```
//!
//! # Environments
//!
//! `master` is the base `.env`, which also holds the provider configuration.
//! Any other environment `<name>` lives in `.env.<name>` and maps to the
//! remote project `<project>::<name>`.

pub mod cli;
pub mod core;
pub mod error;
