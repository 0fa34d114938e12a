//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create an envsync command with correct environment variables.
    ///
    /// Returns a Command configured with:
    /// - HOME set to the temporary home directory
    /// - ENVSYNC_STATE_DIR set to the temporary state directory
    /// - NO_COLOR so output can be matched literally
    /// - Current directory set to the test working directory
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("envsync").expect("failed to find envsync binary");
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("ENVSYNC_STATE_DIR", self.state.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("ENVSYNC_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run `envsync <args>`.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run envsync")
    }

    /// Shortcut for `envsync env list`.
    pub fn env_list(&self) -> Output {
        self.run(&["env", "list"])
    }

    /// Shortcut for `envsync env use <name>`.
    pub fn env_use(&self, name: &str) -> Output {
        self.run(&["env", "use", name])
    }
}
