//! Secret type.
//!
//! A remote record: provider id, variable name (title) and value.

use serde::{Deserialize, Serialize};

use crate::core::types::{SecretId, VarName};

/// A secret as stored by a provider.
///
/// Local files have no ids; `title` is the only join key between local and
/// remote records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Secret {
    pub id: SecretId,
    pub title: VarName,
    pub value: String,
}

impl Secret {
    /// Create a secret.
    pub fn new(id: impl Into<SecretId>, title: impl Into<VarName>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            value: value.into(),
        }
    }

    /// Create a secret with a freshly allocated id.
    pub fn generate(title: impl Into<VarName>, value: impl Into<String>) -> Self {
        Self::new(uuid::Uuid::new_v4().simple().to_string(), title, value)
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}
