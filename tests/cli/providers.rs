//! Tests for `envsync providers`.

use crate::support::*;

#[test]
fn test_lists_every_provider() {
    let t = Test::new();

    let output = t.run(&["providers"]);
    assert_success(&output);
    assert_stdout_contains(&output, "1Password (1password)");
    assert_stdout_contains(&output, "Bitwarden Secrets Manager (bitwarden)");
    assert_stdout_contains(&output, "Contentstack Launch (contentstack)");
    assert_stdout_contains(&output, "CONTENTSTACK_LAUNCH_API_URL");
    assert_stdout_excludes(&output, "[configured]");
}

#[test]
fn test_marks_configured_provider() {
    let t = Test::with_env("BWS_ACCESS_TOKEN=0.token\n");

    let output = t.run(&["providers"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Bitwarden Secrets Manager (bitwarden)  [configured]");
    assert_stdout_excludes(&output, "1Password (1password)  [configured]");
}
