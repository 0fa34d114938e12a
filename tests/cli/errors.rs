//! Tests for error rendering and global flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    let output = t.run(&["--help"]);
    assert_success(&output);
    for command in ["init", "push", "pull", "env", "load", "providers"] {
        assert_stdout_contains(&output, command);
    }
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    t.cmd()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown-command"));
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.run(&["--version"]);
    assert_success(&output);
    assert_stdout_contains(&output, "envsync");
}

#[test]
fn test_errors_exit_with_one() {
    let t = Test::new();

    let output = t.run(&["push"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "✗");
}

#[test]
fn test_verbose_flag_accepted() {
    let t = Test::with_env("");

    let output = t.run(&["--verbose", "env", "list"]);
    assert_success(&output);
}

#[test]
fn test_log_filter_writes_plain_text_to_stderr() {
    let t = Test::with_env("");

    let output = t
        .cmd()
        .env("ENVSYNC_LOG", "envsync=debug")
        .args(["env", "use", "master"])
        .output()
        .expect("failed to run envsync");

    assert_success(&output);
    assert_stderr_contains(&output, "current environment saved");
    assert!(stderr(&output).lines().all(|l| !l.trim_start().starts_with('{')));
    assert_stdout_excludes(&output, "current environment saved");
}

#[test]
fn test_parse_error_names_line() {
    let t = Test::with_env("GOOD=1\nthis line is broken\n");

    let output = t.run(&["push"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "line 2");
}

#[test]
fn test_completions() {
    let t = Test::new();

    let output = t.run(&["completions", "bash"]);
    assert_success(&output);
    assert_stdout_contains(&output, "envsync");
}
