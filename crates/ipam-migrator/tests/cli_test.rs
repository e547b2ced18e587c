//! Integration tests for the `ipam-migrator` binary.
//!
//! Argument parsing, configuration errors and exit codes, all without a
//! live IPAM server.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command with the user's config and environment hidden.
fn migrator_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ipam-migrator");
    cmd.env("HOME", "/tmp/ipam-migrator-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/ipam-migrator-test-nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("IPAM_MIGRATOR_DEFAULTS__TIMEOUT")
        .env_remove("IPAM_MIGRATOR_DEFAULTS__RETRIES")
        .env_remove("IPAM_MIGRATOR_DEFAULTS__LOG_LEVEL")
        .env_remove("IPAM_MIGRATOR_DEFAULTS__OUTPUT");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A port nothing listens on; connections are refused immediately.
const DEAD_NETBOX: &str = "http://127.0.0.1:1/api,netbox,token,0123456789abcdef";

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = migrator_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    migrator_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("phpIPAM")
            .and(predicate::str::contains("--dry-run"))
            .and(predicate::str::contains("--skip"))
            .and(predicate::str::contains("ENDPOINT,TYPE,AUTH-METHOD,AUTH-DATA")),
    );
}

#[test]
fn test_version_flag() {
    migrator_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ipam-migrator"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    migrator_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ipam-migrator"));
}

#[test]
fn test_completions_zsh() {
    migrator_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Configuration errors (exit 2) ───────────────────────────────────

#[test]
fn test_unknown_backend_type() {
    migrator_cmd()
        .arg("https://ipam.example.com/api,foo,token,abc")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown backend type 'foo'"));
}

#[test]
fn test_wrong_auth_method_for_kind() {
    migrator_cmd()
        .arg("https://netbox.example.com/api,netbox,login,admin,secret")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported auth method 'login'"));
}

#[test]
fn test_missing_auth_data() {
    migrator_cmd()
        .arg("https://netbox.example.com/api,netbox,token")
        .assert()
        .code(2);
}

#[test]
fn test_phpipam_endpoint_needs_app_id() {
    migrator_cmd()
        .arg("https://ipam.example.com/,phpipam,login,admin,secret")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("phpIPAM endpoint"));
}

#[test]
fn test_bad_output_tuple_fails_before_reading() {
    // The input is unreachable; a config error on OUTPUT must win.
    migrator_cmd()
        .args([DEAD_NETBOX, "not-a-url,netbox,token,abc"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid endpoint URL"));
}

#[test]
fn test_unknown_skip_kind() {
    let output = migrator_cmd()
        .args([DEAD_NETBOX, "--skip", "switches"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("ip-addresses"), "Expected kind list in output:\n{text}");
}

#[test]
fn test_unknown_named_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[backends.netbox]\n\
         endpoint = \"https://netbox.example.com/api\"\n\
         kind = \"netbox\"\n\
         auth_method = \"token\"\n\
         token = \"abc\""
    )
    .unwrap();

    migrator_cmd()
        .args(["--config", path.to_str().unwrap(), "@phpipam"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("@netbox"));
}

#[test]
fn test_missing_config_file() {
    migrator_cmd()
        .args(["--config", "/tmp/ipam-migrator-test-nonexistent/config.toml", "@netbox"])
        .assert()
        .code(2);
}

// ── Runtime failures ────────────────────────────────────────────────

#[test]
fn test_connection_refused_exits_7() {
    migrator_cmd()
        .args([DEAD_NETBOX, "--retries", "0", "--timeout", "5"])
        .assert()
        .code(7);
}

#[test]
fn test_log_file_receives_events() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("migrate.log");

    migrator_cmd()
        .args([DEAD_NETBOX, "--retries", "0", "--log-level", "debug", "--log"])
        .arg(&log)
        .assert()
        .code(7);

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("reading roles from input"), "{contents}");
    assert!(!contents.contains('\u{1b}'), "log file must not contain ANSI escapes");
}
