//! Core library components.
//!
//! Everything the commands build on: env files, environments and their
//! state, the diff engine, remote providers and the push/pull flows.

pub mod constants;
pub mod diff;
pub mod domain;
pub mod envfile;
pub mod environment;
pub mod fs;
pub mod provider;
pub mod state;
pub mod sync;
pub mod types;
