//! Integration tests for the `hunter` CLI binary.
//!
//! Argument parsing, help output, shell completions and error exit codes,
//! plus a few end-to-end runs against a wiremock backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const HUNTER_VARS: &[&str] = &[
    "HUNTER_API_BASE_URL",
    "HUNTER_SOCKET_URL",
    "HUNTER_API_SECRET_KEY",
    "HUNTER_TIMEOUT_SECS",
    "HUNTER_INSECURE",
    "HUNTER_CA_CERT",
    "HUNTER_RECONNECT_ATTEMPTS",
    "HUNTER_RECONNECT_DELAY_MS",
    "HUNTER_CACHE_MAX_AGE_SECS",
];

/// Build a [`Command`] for the `hunter` binary with env isolation.
///
/// Clears all `HUNTER_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn hunter_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hunter");
    cmd.env("HOME", "/tmp/hunter-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/hunter-cli-test-nonexistent")
        .env_remove("RUST_LOG");
    for var in HUNTER_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// A command aimed at `server` with a fixed API key, so the keyring is never consulted.
fn backend_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = hunter_cmd();
    cmd.env("HUNTER_API_SECRET_KEY", "test-key")
        .args(["--api-url", &format!("{}/api", server.uri()), "--color", "never"]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = hunter_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    hunter_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("BaiduIndexHunter")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("time-range"))
            .and(predicate::str::contains("get"))
            .and(predicate::str::contains("key")),
    );
}

#[test]
fn test_version_flag() {
    hunter_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    hunter_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    hunter_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = hunter_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = hunter_cmd()
        .args(["--output", "yaml", "time-range"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("possible values") || text.contains("invalid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_get_requires_path() {
    hunter_cmd().arg("get").assert().code(2);
}

#[test]
fn test_bad_api_url_is_usage_error() {
    hunter_cmd()
        .args(["--api-url", "not a url", "get", "/task/list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("api_base_url"));
}

#[test]
fn test_malformed_query_is_usage_error() {
    hunter_cmd()
        .env("HUNTER_API_SECRET_KEY", "test-key")
        .args(["get", "/task/list", "-q", "novalue"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("key=value"));
}

#[test]
fn test_unreachable_backend_is_connection_error() {
    hunter_cmd()
        .env("HUNTER_API_SECRET_KEY", "test-key")
        .args(["--api-url", "http://127.0.0.1:9/api", "--timeout", "5"])
        .args(["get", "/task/list"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not reach the backend"));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_key_subcommands_exist() {
    hunter_cmd().args(["key", "--help"]).assert().success().stdout(
        predicate::str::contains("set")
            .and(predicate::str::contains("clear"))
            .and(predicate::str::contains("status")),
    );
}

#[test]
fn test_time_range_help_mentions_refresh() {
    hunter_cmd()
        .args(["time-range", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--refresh"));
}

// ── Against a backend ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_get_prints_envelope_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/task/list"))
        .and(query_param("status", "running"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 10000,
            "msg": "请求成功",
            "data": { "total": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    backend_cmd(&server)
        .args(["-o", "json-compact", "get", "/task/list", "-q", "status=running"])
        .assert()
        .success()
        .stdout(predicate::str::diff("{\"total\":1}\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_time_range_renders_weeks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/word-graph/time-range"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 10000,
            "msg": "请求成功",
            "data": {
                "startDate": "2024-01-01",
                "endDate": "2024-01-31",
                "startDateRaw": "20240101",
                "endDateRaw": "20240131"
            }
        })))
        .mount(&server)
        .await;

    backend_cmd(&server)
        .arg("time-range")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Time range: 2024-01-01 ~ 2024-01-31")
                .and(predicate::str::contains("(5 weeks)"))
                .and(predicate::str::contains("2024-01-29 ~ 2024-02-04")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_key_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/task/list"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 10401,
            "msg": "API Key 无效",
            "data": null
        })))
        .mount(&server)
        .await;

    backend_cmd(&server)
        .args(["get", "/task/list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("hunter key set"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_application_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/word-graph/time-range"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 10102,
            "msg": "没有可用的Cookie",
            "data": null
        })))
        .mount(&server)
        .await;

    backend_cmd(&server)
        .arg("time-range")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("没有可用的Cookie"));
}
