//! Project type.
//!
//! The remote container holding one environment's secrets.

use serde::{Deserialize, Serialize};

use super::Secret;
use crate::core::types::EnvMap;

/// A remote project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub secrets: Vec<Secret>,
}

impl Project {
    /// Create an empty project.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            secrets: Vec::new(),
        }
    }

    /// Attach secrets.
    pub fn with_secrets(mut self, secrets: Vec<Secret>) -> Self {
        self.secrets = secrets;
        self
    }

    /// Secret values keyed by title.
    ///
    /// If a provider returns two secrets with the same title the later one wins.
    pub fn values(&self) -> EnvMap {
        self.secrets
            .iter()
            .map(|s| (s.title.clone(), s.value.clone()))
            .collect()
    }

    /// Find a secret by title.
    pub fn find(&self, title: &str) -> Option<&Secret> {
        self.secrets.iter().find(|s| s.title == title)
    }

    /// Number of secrets.
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether the project holds no secrets.
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}
