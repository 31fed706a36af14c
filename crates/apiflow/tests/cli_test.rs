use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MANIFEST: &str = r#"
name: weather-api
runtime: python3.11
start_command: uvicorn main:app --host 0.0.0.0 --port 8000
port: 8000
endpoints: ["/forecast"]
environment:
  required: [WEATHER_KEY]
"#;

fn project(manifest: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("apiflow.yaml"), manifest).unwrap();
    fs::write(dir.path().join("main.py"), "app = None\n").unwrap();
    dir
}

/// 開発者の環境変数や設定ファイルに左右されないコマンド
fn apiflow(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("apiflow").unwrap();
    cmd.env("APIFLOW_CONFIG_PATH", config_dir.join("config.yaml"))
        .env_remove("APIFLOW_TOKEN")
        .env_remove("APIFLOW_API_URL")
        .env_remove("APIFLOW_TARGET")
        .env_remove("APIFLOW_PROTOCOL")
        .env_remove("APIFLOW_REGION")
        .env_remove("APIFLOW_MANIFEST")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("apiflow").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_deploy_help_lists_flags() {
    let mut cmd = Command::cargo_bin("apiflow").unwrap();
    cmd.args(["deploy", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--protocol"))
        .stdout(predicate::str::contains("--target"))
        .stdout(predicate::str::contains("--yes"))
        .stdout(predicate::str::contains("--force"))
        .stdout(predicate::str::contains("--aws-profile"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("apiflow").unwrap();
    cmd.arg("version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("apiflow").unwrap();
    cmd.arg("invalid-command");
    cmd.assert().failure();
}

#[test]
fn test_validate_manifest() {
    let dir = project(MANIFEST);
    let mut cmd = apiflow(dir.path());
    cmd.args(["validate", "--path"]).arg(dir.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("weather-api"))
        .stdout(predicate::str::contains("WEATHER_KEY"));
}

#[test]
fn test_validate_json() {
    let dir = project(MANIFEST);
    let mut cmd = apiflow(dir.path());
    cmd.args(["--json", "validate", "--path"]).arg(dir.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""status":"valid""#))
        .stdout(predicate::str::contains(r#""name":"weather-api""#));
}

#[test]
fn test_validate_rejects_bad_manifest() {
    let dir = project(&MANIFEST.replace("port: 8000", "port: 0"));
    let mut cmd = apiflow(dir.path());
    cmd.args(["--json", "validate", "--path"]).arg(dir.path());
    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("ManifestValidationError"))
        .stdout(predicate::str::contains("port"));
}

#[test]
fn test_deploy_without_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = apiflow(dir.path());
    cmd.args(["deploy", "--path"]).arg(dir.path());
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("apiflow.yaml"));
}

#[test]
fn test_deploy_without_token_reports_config_error() {
    let dir = project(MANIFEST);
    let mut cmd = apiflow(dir.path());
    cmd.args(["--json", "deploy", "--yes", "--path"]).arg(dir.path());
    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(r#""status":"error""#))
        .stdout(predicate::str::contains(r#""kind":"ConfigError""#))
        .stdout(predicate::str::contains("APIFLOW_TOKEN"));
}

#[test]
fn test_deploy_version_requires_legacy_protocol() {
    let dir = project(MANIFEST);
    let mut cmd = apiflow(dir.path());
    cmd.env("APIFLOW_TOKEN", "test-token")
        .args(["--json", "deploy", "--protocol", "hosted", "--version", "v3"])
        .arg("--path")
        .arg(dir.path());
    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(r#""kind":"ConfigError""#))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn test_unknown_target_rejected() {
    let dir = project(MANIFEST);
    let mut cmd = apiflow(dir.path());
    cmd.args(["deploy", "--target", "mainframe", "--path"])
        .arg(dir.path());
    cmd.assert().failure();
}
