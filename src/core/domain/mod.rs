//! Domain types.

mod project;
mod secret;

pub use project::Project;
pub use secret::Secret;
