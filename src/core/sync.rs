//! Push and pull.
//!
//! Ties the env file store, a storage client and the diff engine together.
//! Without `apply` both directions only compute the change set. With `apply`
//! the remote side is committed with a single `set_project` call and the
//! local side with a single file write.

use tracing::{debug, info, warn};

use crate::core::constants::{env_file_name, remote_environment};
use crate::core::diff::{compute_pull_diff, compute_push_diff, DiffChange, DiffResult};
use crate::core::domain::{Project, Secret};
use crate::core::envfile::{EnvFileStore, EnvFiles};
use crate::core::environment::validate_new_environment_name;
use crate::core::provider::{all_client_env_keys, StorageClient};
use crate::core::types::EnvMap;
use crate::error::{Error, ProviderError, Result};

/// Variables a push sends: the environment's file without client keys.
pub fn push_payload(files: &EnvFiles, client_env_keys: &[&str]) -> EnvMap {
    files
        .environment_env_map
        .iter()
        .filter(|(key, _)| !client_env_keys.contains(&key.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Compare local variables with the remote project and optionally upload.
///
/// The payload is validated by the client before anything is fetched.
pub fn push(
    client: &dyn StorageClient,
    files: &EnvFiles,
    environment: &str,
    apply: bool,
) -> Result<DiffResult> {
    let keys = client.client_env_keys();
    let payload = push_payload(files, &keys);
    client.validate_secrets(&payload)?;

    let remote_env = remote_environment(environment);
    let project = client.get_project(remote_env)?;
    let diff = compute_push_diff(&payload, &project.values());
    debug!(
        environment,
        added = diff.added_count(),
        modified = diff.modified_count(),
        deleted = diff.deleted_count(),
        "push diff computed"
    );

    if apply && !diff.is_empty() {
        let updated = apply_push(project, &diff);
        client.set_project(&updated, remote_env)?;
        info!(environment, changes = diff.total_count(), provider = client.name(), "pushed");
    }

    Ok(diff)
}

/// Compare the remote project with local variables and optionally write them.
///
/// Client keys are never taken from the remote and never removed locally.
pub fn pull(
    client: &dyn StorageClient,
    store: &EnvFileStore,
    files: &EnvFiles,
    environment: &str,
    apply: bool,
) -> Result<DiffResult> {
    let project = client.get_project(remote_environment(environment))?;
    let keys = client.client_env_keys();
    let mut remote = project.values();
    remote.retain(|key, _| !keys.contains(&key.as_str()));
    let diff = compute_pull_diff(&files.environment_env_map, &remote, &keys);
    debug!(
        environment,
        added = diff.added_count(),
        modified = diff.modified_count(),
        deleted = diff.deleted_count(),
        "pull diff computed"
    );

    if apply && !diff.is_empty() {
        let updated = apply_pull(files.environment_env_map.clone(), &diff);
        store.write(&updated, &files.env_file_name)?;
        info!(environment, changes = diff.total_count(), file = %files.env_file_name, "pulled");
    }

    Ok(diff)
}

/// Apply a push diff to the remote project's secret list.
///
/// Added keys get a fresh id, modified secrets keep theirs.
pub fn apply_push(mut project: Project, diff: &DiffResult) -> Project {
    for change in diff.changes() {
        match change {
            DiffChange::Added { key, new_value } => {
                project.secrets.push(Secret::generate(key.as_str(), new_value.as_str()));
            }
            DiffChange::Modified { key, new_value, .. } => {
                if let Some(secret) = project.secrets.iter_mut().find(|s| &s.title == key) {
                    secret.value = new_value.clone();
                }
            }
            DiffChange::Deleted { key, .. } => {
                if let Some(id) = project.find(key).map(|s| s.id.clone()) {
                    project.secrets.retain(|s| s.id != id);
                }
            }
        }
    }
    project
}

/// Apply a pull diff to a local map.
pub fn apply_pull(mut map: EnvMap, diff: &DiffResult) -> EnvMap {
    for change in diff.changes() {
        match change {
            DiffChange::Added { key, new_value } | DiffChange::Modified { key, new_value, .. } => {
                map.insert(key.clone(), new_value.clone());
            }
            DiffChange::Deleted { key, .. } => {
                map.remove(key);
            }
        }
    }
    map
}

/// Variables for a child process: base file overlaid by the environment's
/// file, without any provider's configuration keys.
pub fn load_vars(files: &EnvFiles) -> EnvMap {
    let client_keys = all_client_env_keys();
    files
        .env_map
        .iter()
        .chain(&files.environment_env_map)
        .filter(|(key, _)| !client_keys.contains(&key.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Create a named environment: its local file, then its remote project.
///
/// A remote project that already exists is reused.
pub fn create_environment(
    client: &dyn StorageClient,
    store: &EnvFileStore,
    name: &str,
) -> Result<String> {
    let name = validate_new_environment_name(name)?;
    let file_name = env_file_name(&name);
    store.create(&file_name)?;

    match client.create_project(Some(&name)) {
        Ok(project) => debug!(project = %project.title, "remote project created"),
        Err(Error::Provider(ProviderError::AlreadyExists(what))) => {
            warn!(project = %what, "remote project already exists, reusing it");
        }
        Err(e) => return Err(e),
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::MemoryClient;
    use std::fs;
    use tempfile::TempDir;

    const TOKEN: &str = "OP_SERVICE_ACCOUNT_TOKEN";

    fn map(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn master_files(pairs: &[(&str, &str)]) -> EnvFiles {
        EnvFiles {
            env_map: map(pairs),
            environment_env_map: map(pairs),
            env_file_name: ".env".to_string(),
        }
    }

    #[test]
    fn test_push_preview_ignores_client_keys() {
        let client = MemoryClient::new(&[TOKEN]).with_project(None, &[("API_KEY", "new")]);
        let files = master_files(&[(TOKEN, "t"), ("API_KEY", "old")]);

        let diff = push(&client, &files, "master", false).unwrap();

        assert_eq!(diff.total_count(), 1);
        assert_eq!(
            diff.changes()[0],
            DiffChange::Modified {
                key: "API_KEY".to_string(),
                old_value: "new".to_string(),
                new_value: "old".to_string(),
            }
        );
        assert_eq!(client.commits(), 0);
    }

    #[test]
    fn test_push_apply_commits_once() {
        let client = MemoryClient::new(&[TOKEN])
            .with_project(None, &[("KEEP", "k"), ("CHANGE", "before"), ("DROP", "d")]);
        let files = master_files(&[(TOKEN, "t"), ("KEEP", "k"), ("CHANGE", "after"), ("ADD", "a")]);
        let keep_id = client.project(None).unwrap().find("CHANGE").unwrap().id.clone();

        let diff = push(&client, &files, "master", true).unwrap();
        assert_eq!(diff.total_count(), 3);
        assert_eq!(client.commits(), 1);

        let remote = client.project(None).unwrap();
        assert_eq!(remote.values(), map(&[("KEEP", "k"), ("CHANGE", "after"), ("ADD", "a")]));
        assert_eq!(remote.find("CHANGE").unwrap().id, keep_id);

        let again = push(&client, &files, "master", true).unwrap();
        assert!(again.is_empty());
        assert_eq!(client.commits(), 1);
    }

    #[test]
    fn test_push_named_environment_uses_overlay() {
        let client = MemoryClient::new(&[TOKEN]).with_project(Some("dev"), &[]);
        let files = EnvFiles {
            env_map: map(&[(TOKEN, "t"), ("BASE_ONLY", "b")]),
            environment_env_map: map(&[("DEV_KEY", "d")]),
            env_file_name: ".env.dev".to_string(),
        };

        push(&client, &files, "dev", true).unwrap();

        assert_eq!(client.project(Some("dev")).unwrap().values(), map(&[("DEV_KEY", "d")]));
    }

    #[test]
    fn test_push_validation_runs_before_fetch() {
        // no project seeded: a fetch would fail with NotFound
        let client = MemoryClient::new(&[]).rejecting_empty_values();
        let files = master_files(&[("EMPTY", "")]);

        let err = push(&client, &files, "master", true).unwrap_err();
        assert!(matches!(
            err,
            Error::Provider(ProviderError::InvalidSecrets(_))
        ));
    }

    #[test]
    fn test_push_missing_project() {
        let client = MemoryClient::new(&[]);
        let err = push(&client, &master_files(&[]), "staging", false).unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::NotFound(_))));
    }

    #[test]
    fn test_pull_apply_writes_environment_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".env"), format!("{}=t\n", TOKEN)).unwrap();
        fs::write(tmp.path().join(".env.dev"), "LOCAL_ONLY=x\nSHARED=old\n").unwrap();
        let store = EnvFileStore::new(tmp.path());
        let client = MemoryClient::new(&[TOKEN])
            .with_project(Some("dev"), &[("SHARED", "new"), ("REMOTE", "r")]);

        let files = store.read_env_files(Some("dev")).unwrap();
        let diff = pull(&client, &store, &files, "dev", true).unwrap();

        assert_eq!(diff.added_count(), 1);
        assert_eq!(diff.modified_count(), 1);
        assert_eq!(diff.deleted_count(), 1);
        assert_eq!(
            store.read(".env.dev").unwrap(),
            map(&[("SHARED", "new"), ("REMOTE", "r")])
        );
        // base file untouched
        assert_eq!(store.read(".env").unwrap(), map(&[(TOKEN, "t")]));
    }

    #[test]
    fn test_pull_master_keeps_client_keys() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".env"), format!("{}=t\nSTALE=s\n", TOKEN)).unwrap();
        let store = EnvFileStore::new(tmp.path());
        let client = MemoryClient::new(&[TOKEN]).with_project(None, &[("API_KEY", "k")]);

        let files = store.read_env_files(None).unwrap();
        pull(&client, &store, &files, "master", true).unwrap();

        assert_eq!(
            store.read(".env").unwrap(),
            map(&[(TOKEN, "t"), ("API_KEY", "k")])
        );
    }

    #[test]
    fn test_pull_never_takes_client_keys_from_remote() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".env"), format!("{}=mine\n", TOKEN)).unwrap();
        fs::write(tmp.path().join(".env.dev"), "APP=1\n").unwrap();
        let store = EnvFileStore::new(tmp.path());
        let client = MemoryClient::new(&[TOKEN])
            .with_project(None, &[(TOKEN, "theirs"), ("APP", "1")])
            .with_project(Some("dev"), &[(TOKEN, "theirs"), ("APP", "1")]);

        let files = store.read_env_files(None).unwrap();
        let diff = pull(&client, &store, &files, "master", true).unwrap();
        assert_eq!(diff.changes().len(), 1);
        assert_eq!(diff.added_count(), 1);
        assert_eq!(store.read(".env").unwrap().get(TOKEN).map(String::as_str), Some("mine"));

        let files = store.read_env_files(Some("dev")).unwrap();
        assert!(pull(&client, &store, &files, "dev", true).unwrap().is_empty());
        assert_eq!(store.read(".env.dev").unwrap(), map(&[("APP", "1")]));
    }

    #[test]
    fn test_pull_preview_does_not_write() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".env"), "A=1\n").unwrap();
        let store = EnvFileStore::new(tmp.path());
        let client = MemoryClient::new(&[]).with_project(None, &[("A", "2")]);

        let files = store.read_env_files(None).unwrap();
        let diff = pull(&client, &store, &files, "master", false).unwrap();

        assert_eq!(diff.modified_count(), 1);
        assert_eq!(fs::read_to_string(tmp.path().join(".env")).unwrap(), "A=1\n");
    }

    #[test]
    fn test_apply_push_deletes_by_id() {
        let project = Project::new("p", "app").with_secrets(vec![
            Secret::new("1", "A", "a"),
            Secret::new("2", "B", "b"),
        ]);
        let diff = compute_push_diff(&map(&[("B", "b")]), &project.values());

        let updated = apply_push(project, &diff);

        assert_eq!(updated.secrets, vec![Secret::new("2", "B", "b")]);
    }

    #[test]
    fn test_apply_pull() {
        let local = map(&[("A", "1"), ("B", "2")]);
        let remote = map(&[("A", "9"), ("C", "3")]);
        let diff = compute_pull_diff(&local, &remote, &[]);

        assert_eq!(apply_pull(local, &diff), remote);
    }

    #[test]
    fn test_load_vars_overlays_and_strips_client_keys() {
        let files = EnvFiles {
            env_map: map(&[(TOKEN, "t"), ("OP_VAULT", "v"), ("SHARED", "base"), ("BASE", "b")]),
            environment_env_map: map(&[("SHARED", "dev"), ("DEV", "d")]),
            env_file_name: ".env.dev".to_string(),
        };

        assert_eq!(
            load_vars(&files),
            map(&[("SHARED", "dev"), ("BASE", "b"), ("DEV", "d")])
        );
    }

    #[test]
    fn test_create_environment() {
        let tmp = TempDir::new().unwrap();
        let store = EnvFileStore::new(tmp.path());
        let client = MemoryClient::new(&[]);

        let name = create_environment(&client, &store, " staging ").unwrap();

        assert_eq!(name, "staging");
        assert!(tmp.path().join(".env.staging").is_file());
        assert!(client.project(Some("staging")).is_some());
    }

    #[test]
    fn test_create_environment_reuses_remote_project() {
        let tmp = TempDir::new().unwrap();
        let store = EnvFileStore::new(tmp.path());
        let client = MemoryClient::new(&[]).with_project(Some("qa"), &[("K", "v")]);

        create_environment(&client, &store, "qa").unwrap();

        assert_eq!(client.project(Some("qa")).unwrap().len(), 1);
    }

    #[test]
    fn test_create_environment_rejects_master_and_existing() {
        let tmp = TempDir::new().unwrap();
        let store = EnvFileStore::new(tmp.path());
        let client = MemoryClient::new(&[]);

        assert!(matches!(
            create_environment(&client, &store, "master"),
            Err(Error::Environment(crate::error::EnvironmentError::ReservedName(_)))
        ));

        fs::write(tmp.path().join(".env.dev"), "").unwrap();
        assert!(matches!(
            create_environment(&client, &store, "dev"),
            Err(Error::Environment(crate::error::EnvironmentError::AlreadyExists(_)))
        ));
        assert!(client.project(Some("dev")).is_none());
    }
}
