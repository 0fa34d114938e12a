//! Tests for `envsync push` / `pull` failures that happen before any remote call.

use crate::support::*;

#[test]
fn test_push_without_env_file() {
    let t = Test::new();

    let output = t.run(&["push"]);
    assert_fails_with_hint(&output, "run: envsync init");
}

#[test]
fn test_pull_without_provider() {
    let t = Test::with_env("API_KEY=x\n");

    let output = t.run(&["pull"]);
    assert_fails_with_hint(&output, "envsync providers");
    assert_stderr_contains(&output, "no provider configuration found");
}

#[test]
fn test_push_with_two_providers() {
    let t = Test::with_env("OP_SERVICE_ACCOUNT_TOKEN=a\nBWS_ACCESS_TOKEN=b\n");

    let output = t.run(&["push"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "1password, bitwarden");
}

#[test]
fn test_push_missing_provider_key() {
    let t = Test::with_env("CONTENTSTACK_AUTHTOKEN=t\nCONTENTSTACK_ORGANIZATION_UID=o\n");

    let output = t.run(&["push"]);
    assert_fails_with_hint(&output, "add CONTENTSTACK_PROJECT_UID to .env");
}

#[test]
fn test_explicit_env_requires_its_file() {
    let t = Test::with_env("OP_SERVICE_ACCOUNT_TOKEN=a\n");

    let output = t.run(&["--env", "staging", "push"]);
    assert_fails_with_hint(&output, "envsync env new staging");
}

#[test]
fn test_explicit_env_is_validated() {
    let t = Test::with_env("");

    let output = t.run(&["pull", "--env", "../x"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid characters");
}

#[test]
fn test_current_env_file_missing() {
    let t = Test::with_env("OP_SERVICE_ACCOUNT_TOKEN=a\n");
    t.write(".env.dev", "");
    assert_success(&t.env_use("dev"));
    std::fs::remove_file(t.path(".env.dev")).unwrap();

    let output = t.run(&["push"]);
    assert_fails_with_hint(&output, "envsync env new dev");
}

#[cfg(unix)]
#[test]
fn test_symlinked_env_file_rejected() {
    let t = Test::new();
    let outside = tempfile::TempDir::new().unwrap();
    std::fs::write(outside.path().join("secrets"), "A=1\n").unwrap();
    std::os::unix::fs::symlink(outside.path().join("secrets"), t.path(".env")).unwrap();

    let output = t.run(&["push"]);
    assert_fails_with_hint(&output, "replace the symlink");
}
