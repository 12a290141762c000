// tests/cli_dispatch_test.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn main_command() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

fn write_config(dir: &Path, server_url: &str) -> std::path::PathBuf {
    let path = dir.join("config.json");
    fs::write(
        &path,
        format!(
            r#"{{
  "portal": {{ "base_url": "{url}/", "login_url": "{url}/cas/login" }},
  "network": {{ "connect_timeout_secs": 5, "timeout_secs": 10, "max_retries": 0 }}
}}"#,
            url = server_url
        ),
    )
    .unwrap();
    path
}

// --- Basic CLI behaviour ---

#[test]
fn test_help_flag() {
    let mut cmd = main_command();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Download the courses with these ILIAS ref ids"))
        .stdout(predicate::str::contains("--semester"));
}

#[test]
fn test_no_arguments_shows_usage() {
    let mut cmd = main_command();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage: ilias-dl"));
}

#[test]
fn test_options_without_mode_are_rejected() {
    let mut cmd = main_command();
    cmd.arg("--verbose");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_config_help_prints_guide() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("my-config.json");
    let mut cmd = main_command();
    cmd.arg("--config-help").arg("--config").arg(&config_path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("my-config.json"))
        .stdout(predicate::str::contains("connect_timeout_secs"));
    assert!(!config_path.exists(), "showing the guide does not write a config file");
}

// --- Startup failures ---

#[test]
fn test_missing_download_directory_fails_before_login() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), "http://127.0.0.1:9");
    let mut cmd = main_command();
    cmd.args(["--course", "1", "-u", "jdoe", "--password", "x"])
        .arg("--config")
        .arg(&config_path)
        .arg("-o")
        .arg(dir.path().join("does-not-exist"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_zero_workers_are_rejected() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), "http://127.0.0.1:9");
    let mut cmd = main_command();
    cmd.args(["--course", "1", "-w", "0", "-u", "jdoe", "--password", "x"])
        .arg("--config")
        .arg(&config_path)
        .arg("-o")
        .arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("download workers must be at least 1"));
}

#[test]
fn test_rejected_login_is_reported() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/cas/login")
        .with_body(r#"<form action="/cas/login"><input name="lt" value="LT-1"></form>"#)
        .create();
    server.mock("POST", "/cas/login").with_status(200).create();
    server
        .mock("GET", "/")
        .with_body("<html><body>Anmeldung fehlgeschlagen</body></html>")
        .create();

    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), &server.url());
    let mut cmd = main_command();
    cmd.args(["--course", "1", "-u", "jdoe", "--password", "wrong"])
        .arg("--config")
        .arg(&config_path)
        .arg("-o")
        .arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Login to ILIAS failed"));
}
