//! Integration tests for the scanpool CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A command isolated from the caller's config files and environment
fn scanpool(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scanpool").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("RUST_LOG")
        .env_remove("LOG_LEVEL")
        .env_remove("SCANPOOL_LOG_LEVEL");
    cmd
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("data");
    fs::create_dir_all(root.join("a/b")).unwrap();
    fs::write(root.join("one.txt"), "1").unwrap();
    fs::write(root.join("a/two.txt"), "22").unwrap();
    fs::write(root.join("a/b/three.rs"), "333").unwrap();
    dir
}

/// Test CLI binary exists and responds to --help
#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    scanpool(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("worker pool"))
        .stdout(predicate::str::contains("scan"));
}

/// Test CLI responds to --version
#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    scanpool(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scanpool"));
}

/// Test invalid subcommand shows error
#[test]
fn test_invalid_subcommand() {
    let dir = TempDir::new().unwrap();
    scanpool(&dir)
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_scan_json_counts() {
    let dir = fixture();
    let output = scanpool(&dir)
        .args(["scan", "data", "--workers", "4", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["counts"]["data"]["files"], 3);
    assert_eq!(report["counts"]["data"]["directories"], 2);
    assert_eq!(report["results"], 2);
    assert_eq!(report["workers"], 4);
    assert!(report["errors"].as_array().unwrap().is_empty());
}

#[test]
fn test_repeated_origin_listed_once() {
    let dir = fixture();
    let output = scanpool(&dir)
        .args(["scan", "data", "data", "--kinds", "files", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["origins"], serde_json::json!(["data"]));
    assert_eq!(report["counts"]["data"]["files"], 3);
    assert_eq!(report["results"], 1);
}

#[test]
fn test_scan_text_summary() {
    let dir = fixture();
    scanpool(&dir)
        .args(["scan", "data", "--kinds", "files"])
        .assert()
        .success()
        .stdout(predicate::str::contains("data"))
        .stdout(predicate::str::contains("files"))
        .stdout(predicate::str::contains("3 resources found across 1 origins"));
}

#[test]
fn test_scan_include_and_depth() {
    let dir = fixture();
    let output = scanpool(&dir)
        .args(["scan", "data", "--kinds", "files", "--include", "**/*.rs", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["counts"]["data"]["files"], 1);

    let output = scanpool(&dir)
        .args(["scan", "data", "--kinds", "files", "--max-depth", "1", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["counts"]["data"]["files"], 1);
}

#[test]
fn test_scan_defaults_to_working_directory() {
    let dir = fixture();
    scanpool(&dir)
        .args(["-C", "data", "scan", "--kinds", "directories", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"directories\": 2"));
}

#[test]
fn test_missing_origin_reported_without_failing() {
    let dir = fixture();
    scanpool(&dir)
        .args(["scan", "data", "missing"])
        .assert()
        .success()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn test_fail_on_error_exits_non_zero() {
    let dir = fixture();
    scanpool(&dir)
        .args(["scan", "data", "missing", "--fail-on-error"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("listing jobs failed"));
}

#[test]
fn test_fail_on_error_from_config_file() {
    let dir = fixture();
    fs::write(dir.path().join("scanpool.toml"), "fail_on_error = true\n").unwrap();
    scanpool(&dir)
        .args(["scan", "missing", "--quiet"])
        .assert()
        .failure();
}

#[test]
fn test_origins_from_config_file() {
    let dir = fixture();
    fs::write(
        dir.path().join("ci.yaml"),
        "scan:\n  origins: [data]\n  kinds: [files]\n",
    )
    .unwrap();

    let output = scanpool(&dir)
        .args(["scan", "--config", "ci.yaml", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["origins"], serde_json::json!(["data"]));
    assert_eq!(report["counts"]["data"]["files"], 3);
}

#[test]
fn test_environment_sets_workers() {
    let dir = fixture();
    scanpool(&dir)
        .env("SCANPOOL_POOL__WORKERS", "2")
        .args(["scan", "data", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"workers\": 2"));
}

#[test]
fn test_invalid_configuration_rejected() {
    let dir = fixture();
    scanpool(&dir)
        .args(["scan", "data", "--capacity", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("result_capacity"));

    scanpool(&dir)
        .args(["scan", "data", "--timeout", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_secs"));
}

#[test]
fn test_config_show() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("scanpool.toml"), "[pool]\nworkers = 7\n").unwrap();

    scanpool(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"workers\": 7"))
        .stdout(predicate::str::contains("\"timeout_secs\": 30"));

    scanpool(&dir)
        .args(["config", "show", "pool.workers"])
        .assert()
        .success()
        .stdout(predicate::str::diff("7\n"));
}

#[test]
fn test_config_validate() {
    let dir = TempDir::new().unwrap();
    scanpool(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));

    fs::write(dir.path().join("scanpool.toml"), "log_level = \"loud\"\n").unwrap();
    scanpool(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("log_level"));
}

#[test]
fn test_missing_custom_config() {
    let dir = TempDir::new().unwrap();
    scanpool(&dir)
        .args(["config", "show", "--config", "absent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
