//! Constants used throughout envsync.
//!
//! Centralizes magic strings and configuration values.

/// Base environment file name (.env).
pub const ENV_FILE: &str = ".env";

/// Prefix of environment-specific files (.env.<name>).
pub const ENV_FILE_PREFIX: &str = ".env.";

/// Environment name that always refers to the base `.env` file.
pub const MASTER: &str = "master";

/// Separator between project and environment in remote project names.
pub const SEPARATOR: &str = "::";

/// Characters that may not appear in an environment name.
pub const INVALID_NAME_CHARS: &[char] = &['/', '\\', '?', '*', ':', '|', '<', '>', '"'];

/// Application directory under the per-user state directory.
pub const STATE_DIR: &str = "envsync";

/// Current-environment state file name.
pub const STATE_FILE: &str = "state.json";

/// Overrides the state directory.
pub const STATE_DIR_ENV: &str = "ENVSYNC_STATE_DIR";

/// Log filter environment variable.
pub const LOG_ENV: &str = "ENVSYNC_LOG";

/// File name holding the variables of `environment`.
///
/// `master` maps to `.env`; every other name maps to `.env.<name>`.
pub fn env_file_name(environment: &str) -> String {
    if environment == MASTER {
        ENV_FILE.to_string()
    } else {
        format!("{}{}", ENV_FILE_PREFIX, environment)
    }
}

/// Environment argument handed to a storage client (`None` for master).
pub fn remote_environment(environment: &str) -> Option<&str> {
    if environment == MASTER {
        None
    } else {
        Some(environment)
    }
}

/// Remote project name for `project` in `environment`.
pub fn remote_project_name(project: &str, environment: Option<&str>) -> String {
    match environment {
        Some(env) if env != MASTER => format!("{}{}{}", project, SEPARATOR, env),
        _ => project.to_string(),
    }
}
