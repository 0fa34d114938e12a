//! Tests for `envsync init` without a terminal.

use crate::support::*;

#[test]
fn test_init_without_provider_fails() {
    let t = Test::new();

    let output = t.run(&["init"]);
    assert_fails_with_hint(&output, "envsync providers");
    assert!(!t.path(".env").exists());
}

#[test]
fn test_init_unknown_provider() {
    let t = Test::new();

    let output = t.run(&["init", "--provider", "vault"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "unknown provider: vault");
}

#[test]
fn test_init_reports_first_missing_key() {
    let t = Test::new();

    let output = t.run(&["init", "--provider", "op"]);
    assert_fails_with_hint(&output, "add OP_SERVICE_ACCOUNT_TOKEN to .env");
}

#[test]
fn test_init_reports_missing_key_from_existing_env() {
    let t = Test::with_env("BWS_ACCESS_TOKEN=0.token\nBWS_PROJECT=app\n");

    let output = t.run(&["init"]);
    assert_fails_with_hint(&output, "add BWS_ORGANIZATION_ID to .env");
    // existing file untouched
    assert_eq!(t.read(".env"), "BWS_ACCESS_TOKEN=0.token\nBWS_PROJECT=app\n");
}
