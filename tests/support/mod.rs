//! Test support utilities for envsync integration tests.
//!
//! Provides an isolated working directory, home and state directory per test.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;

#[allow(unused_imports)]
pub use assertions::*;

use std::fs;
use std::path::PathBuf;

use envsync::core::envfile::EnvFileStore;
use envsync::core::environment::Environments;
use envsync::core::state::StateFile;
use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Child processes get `.current_dir()` and env overrides, so no process
/// global state is mutated and tests can run in parallel.
pub struct Test {
    /// Working directory holding the `.env` files
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
    /// Directory holding the state file
    pub state: TempDir,
}

impl Test {
    /// Create an empty test environment.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
            home: TempDir::new().expect("failed to create temp home"),
            state: TempDir::new().expect("failed to create temp state dir"),
        }
    }

    /// Create a test environment with `.env` holding `contents`.
    pub fn with_env(contents: &str) -> Self {
        let t = Self::new();
        t.write(".env", contents);
        t
    }

    /// Write a file in the working directory.
    pub fn write(&self, name: &str, contents: &str) {
        fs::write(self.dir.path().join(name), contents).expect("failed to write file");
    }

    /// Read a file from the working directory.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).expect("failed to read file")
    }

    /// Path of a file in the working directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Location of the state file the binary uses.
    pub fn state_file(&self) -> PathBuf {
        self.state.path().join("state.json")
    }

    /// File store rooted at the working directory.
    pub fn store(&self) -> EnvFileStore {
        EnvFileStore::new(self.dir.path())
    }

    /// Registry for the working directory using this test's state file.
    ///
    /// Keyed the same way the binary keys it (the process working directory
    /// of a child is the canonical path).
    pub fn environments(&self) -> Environments<StateFile> {
        let dir = fs::canonicalize(self.dir.path()).expect("failed to canonicalize");
        Environments::new(dir, StateFile::new(self.state_file()))
    }
}
