//! Running provider CLIs.

use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::ProviderError;

/// An external CLI a provider drives.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tool {
    pub program: &'static str,
    pub install_url: &'static str,
}

impl Tool {
    /// Fail early with an install hint when the program is not on `PATH`.
    pub fn ensure_installed(&self) -> Result<(), ProviderError> {
        which::which(self.program)
            .map(|_| ())
            .map_err(|_| self.not_installed())
    }

    fn not_installed(&self) -> ProviderError {
        ProviderError::NotInstalled {
            tool: self.program,
            url: self.install_url,
        }
    }

    /// Run `cmd` and return its stdout.
    ///
    /// A non-zero exit is mapped through [`classify_failure`].
    pub fn output(&self, mut cmd: Command) -> Result<String, ProviderError> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(self.not_installed());
            }
            Err(e) => return Err(ProviderError::CommandFailed(e.to_string())),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(program = self.program, status = ?output.status.code(), "provider command failed");
            return Err(classify_failure(stderr.trim()));
        }

        String::from_utf8(output.stdout).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

/// Map a CLI's error output onto the provider error taxonomy.
pub(crate) fn classify_failure(stderr: &str) -> ProviderError {
    let lower = stderr.to_ascii_lowercase();
    let message = stderr.to_string();

    if lower.contains("isn't an item")
        || lower.contains("not found")
        || lower.contains("404")
        || lower.contains("no such")
    {
        ProviderError::NotFound(message)
    } else if lower.contains("already exists") || lower.contains("409") {
        ProviderError::AlreadyExists(message)
    } else if lower.contains("unauthorized")
        || lower.contains("not currently signed in")
        || lower.contains("invalid token")
        || lower.contains("access token")
        || lower.contains("401")
        || lower.contains("403")
    {
        ProviderError::AuthFailed(message)
    } else if lower.contains("connection")
        || lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("dns")
        || lower.contains("network")
    {
        ProviderError::NetworkError(message)
    } else {
        ProviderError::CommandFailed(message)
    }
}
