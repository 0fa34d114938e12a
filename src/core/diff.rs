//! Diff engine.
//!
//! Computes the change set between a local variable map and the remote
//! secret values. Push and pull run in opposite directions and treat empty
//! values and deletions differently:
//!
//! - push never proposes deleting a remote secret whose value is empty;
//! - pull treats a key present locally with an empty value as present, and
//!   never proposes deleting client configuration keys.
//!
//! Pure functions, no I/O.

use std::fmt;

use crate::core::types::{EnvMap, VarName};

/// Kind of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        };
        f.write_str(label)
    }
}

/// One change between the two sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffChange {
    Added {
        key: VarName,
        new_value: String,
    },
    Modified {
        key: VarName,
        old_value: String,
        new_value: String,
    },
    Deleted {
        key: VarName,
        old_value: String,
    },
}

impl DiffChange {
    /// Variable name.
    pub fn key(&self) -> &str {
        match self {
            DiffChange::Added { key, .. }
            | DiffChange::Modified { key, .. }
            | DiffChange::Deleted { key, .. } => key.as_str(),
        }
    }

    /// Kind of change.
    pub fn kind(&self) -> ChangeKind {
        match self {
            DiffChange::Added { .. } => ChangeKind::Added,
            DiffChange::Modified { .. } => ChangeKind::Modified,
            DiffChange::Deleted { .. } => ChangeKind::Deleted,
        }
    }

    /// Value before the change (modified, deleted).
    pub fn old_value(&self) -> Option<&str> {
        match self {
            DiffChange::Added { .. } => None,
            DiffChange::Modified { old_value, .. } | DiffChange::Deleted { old_value, .. } => {
                Some(old_value.as_str())
            }
        }
    }

    /// Value after the change (added, modified).
    pub fn new_value(&self) -> Option<&str> {
        match self {
            DiffChange::Added { new_value, .. } | DiffChange::Modified { new_value, .. } => {
                Some(new_value.as_str())
            }
            DiffChange::Deleted { .. } => None,
        }
    }
}

/// A full change set with per-kind counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    changes: Vec<DiffChange>,
    added_count: usize,
    modified_count: usize,
    deleted_count: usize,
}

impl DiffResult {
    /// Build a result from changes, counting each kind.
    pub fn from_changes(changes: Vec<DiffChange>) -> Self {
        let mut result = Self::default();
        for change in &changes {
            match change.kind() {
                ChangeKind::Added => result.added_count += 1,
                ChangeKind::Modified => result.modified_count += 1,
                ChangeKind::Deleted => result.deleted_count += 1,
            }
        }
        result.changes = changes;
        result
    }

    /// Changes in emission order.
    pub fn changes(&self) -> &[DiffChange] {
        &self.changes
    }

    pub fn added_count(&self) -> usize {
        self.added_count
    }

    pub fn modified_count(&self) -> usize {
        self.modified_count
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted_count
    }

    /// Sum of all counts; always equals `changes().len()`.
    pub fn total_count(&self) -> usize {
        self.added_count + self.modified_count + self.deleted_count
    }

    /// Whether both sides already agree.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Changes needed to make the remote match `local`.
///
/// Local-driven changes (added, modified) come first in key order, then
/// deletions of remote-only keys in key order. A remote-only key whose value
/// is empty is not a deletion target.
pub fn compute_push_diff(local: &EnvMap, remote: &EnvMap) -> DiffResult {
    let mut changes = Vec::new();

    for (key, local_value) in local {
        match remote.get(key) {
            Some(remote_value) if remote_value != local_value => {
                changes.push(DiffChange::Modified {
                    key: key.clone(),
                    old_value: remote_value.clone(),
                    new_value: local_value.clone(),
                });
            }
            Some(_) => {}
            None => changes.push(DiffChange::Added {
                key: key.clone(),
                new_value: local_value.clone(),
            }),
        }
    }

    for (key, remote_value) in remote {
        if !local.contains_key(key) && !remote_value.is_empty() {
            changes.push(DiffChange::Deleted {
                key: key.clone(),
                old_value: remote_value.clone(),
            });
        }
    }

    DiffResult::from_changes(changes)
}

/// Changes needed to make `local` match the remote.
///
/// A key present locally, even with an empty value, is compared rather than
/// added. Local-only keys listed in `client_env_keys` are never deleted.
pub fn compute_pull_diff(local: &EnvMap, remote: &EnvMap, client_env_keys: &[&str]) -> DiffResult {
    let mut changes = Vec::new();

    for (key, remote_value) in remote {
        match local.get(key) {
            None => changes.push(DiffChange::Added {
                key: key.clone(),
                new_value: remote_value.clone(),
            }),
            Some(local_value) if local_value != remote_value => {
                changes.push(DiffChange::Modified {
                    key: key.clone(),
                    old_value: local_value.clone(),
                    new_value: remote_value.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for (key, local_value) in local {
        if !remote.contains_key(key) && !client_env_keys.contains(&key.as_str()) {
            changes.push(DiffChange::Deleted {
                key: key.clone(),
                old_value: local_value.clone(),
            });
        }
    }

    DiffResult::from_changes(changes)
}
