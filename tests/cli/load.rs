//! Tests for `envsync load`.

#![cfg(unix)]

use crate::support::*;

#[test]
fn test_load_exports_variables() {
    let t = Test::with_env("API_KEY=secret123\n");

    let output = t.run(&["load", "--", "sh", "-c", "printf '%s' \"$API_KEY\""]);
    assert_success(&output);
    assert_eq!(stdout(&output), "secret123");
}

#[test]
fn test_load_strips_provider_configuration() {
    let t = Test::with_env("OP_SERVICE_ACCOUNT_TOKEN=ops_token\nOP_VAULT=Dev\nAPP=1\n");

    let output = t
        .cmd()
        .env_remove("OP_SERVICE_ACCOUNT_TOKEN")
        .env_remove("OP_VAULT")
        .args([
            "load",
            "--",
            "sh",
            "-c",
            "printf '[%s][%s][%s]' \"$OP_SERVICE_ACCOUNT_TOKEN\" \"$OP_VAULT\" \"$APP\"",
        ])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output), "[][][1]");
}

#[test]
fn test_load_overlays_environment() {
    let t = Test::with_env("SHARED=base\nBASE_ONLY=b\n");
    t.write(".env.dev", "SHARED=dev\n");

    let output = t.run(&[
        "--env",
        "dev",
        "load",
        "--",
        "sh",
        "-c",
        "printf '%s %s' \"$SHARED\" \"$BASE_ONLY\"",
    ]);
    assert_success(&output);
    assert_eq!(stdout(&output), "dev b");
}

#[test]
fn test_load_propagates_exit_code() {
    let t = Test::with_env("");

    let output = t.run(&["load", "--", "sh", "-c", "exit 7"]);
    assert_exit_code(&output, 7);
}

#[test]
fn test_load_requires_command() {
    let t = Test::with_env("");
    assert_failure(&t.run(&["load"]));
}
