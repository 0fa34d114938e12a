//! Tests for `envsync env list|new|use`.

use crate::support::*;

const OP_CONFIG: &str = "OP_SERVICE_ACCOUNT_TOKEN=ops_token\nOP_VAULT=Dev\nOP_PROJECT=app\n";

#[test]
fn test_list_empty_directory() {
    let t = Test::new();

    let output = t.env_list();
    assert_success(&output);
    assert_stdout_contains(&output, "no environments found");
}

#[test]
fn test_list_marks_master_current_by_default() {
    let t = Test::with_env("A=1\n");
    t.write(".env.dev", "");
    t.write(".env.master", "");
    t.write(".env.", "");

    let output = t.env_list();
    assert_success(&output);
    assert_eq!(stdout(&output), "* master\n  dev\n");
}

#[test]
fn test_use_switches_current() {
    let t = Test::with_env("");
    t.write(".env.dev", "");

    assert_success(&t.env_use("dev"));

    let output = t.env_list();
    assert_eq!(stdout(&output), "  master\n* dev\n");
    assert_eq!(t.environments().resolve_current().unwrap(), "dev");
}

#[test]
fn test_use_trims_name() {
    let t = Test::with_env("");
    t.write(".env.dev", "");

    assert_success(&t.env_use("  dev "));
    assert_eq!(t.environments().resolve_current().unwrap(), "dev");
}

#[test]
fn test_use_unknown_environment() {
    let t = Test::with_env("");

    let output = t.env_use("prod");
    assert_fails_with_hint(&output, "envsync env list");
    assert_stderr_contains(&output, "environment 'prod' does not exist");
    assert!(!t.state_file().exists());
}

#[test]
fn test_use_invalid_name_lists_characters() {
    let t = Test::with_env("");

    let output = t.env_use("a/b*c");
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid characters: /, *");
}

#[test]
fn test_use_master_is_allowed() {
    let t = Test::with_env("");
    t.write(".env.dev", "");
    assert_success(&t.env_use("dev"));

    assert_success(&t.env_use("master"));
    assert_eq!(t.environments().resolve_current().unwrap(), "master");
}

#[test]
fn test_use_keeps_other_directories() {
    let t = Test::with_env("");
    t.write(".env.dev", "");
    std::fs::write(
        t.state_file(),
        r#"{"/some/other/project": "staging"}"#,
    )
    .unwrap();

    assert_success(&t.env_use("dev"));

    let raw = std::fs::read_to_string(t.state_file()).unwrap();
    let state: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(state["/some/other/project"], "staging");
}

#[test]
fn test_corrupt_state_falls_back_to_master() {
    let t = Test::with_env("");
    t.write(".env.dev", "");
    std::fs::write(t.state_file(), "not json at all").unwrap();

    let output = t.env_list();
    assert_success(&output);
    assert_stdout_contains(&output, "* master");

    assert_success(&t.env_use("dev"));
    assert_eq!(t.environments().resolve_current().unwrap(), "dev");
}

#[test]
fn test_new_master_is_reserved() {
    let t = Test::with_env(OP_CONFIG);

    let output = t.run(&["env", "new", "master"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "reserved");
    assert!(!t.path(".env.master").exists());
}

#[test]
fn test_new_requires_provider() {
    let t = Test::with_env("A=1\n");

    let output = t.run(&["env", "new", "dev"]);
    assert_fails_with_hint(&output, "envsync providers");
    assert!(!t.path(".env.dev").exists());
}

#[test]
fn test_new_without_base_file() {
    let t = Test::new();

    let output = t.run(&["env", "new", "dev"]);
    assert_fails_with_hint(&output, "envsync init");
}
