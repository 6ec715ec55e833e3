#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Nothing listens on the discard port, so the generation client is always
/// unreachable and the brain never starts.
const DEAD_OLLAMA: &str = "http://127.0.0.1:9";

fn selflow() -> Command {
    let mut cmd = Command::cargo_bin("selflow").unwrap();
    cmd.env_remove("SELFLOW_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, yaml: &str) -> std::path::PathBuf {
    let path = dir.path().join("selflow.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

// ---------------------------------------------------------------------------
// selflow --help
// ---------------------------------------------------------------------------

#[test]
fn help_lists_commands() {
    selflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("command"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("health"));
}

// ---------------------------------------------------------------------------
// selflow config
// ---------------------------------------------------------------------------

#[test]
fn default_config_is_valid() {
    selflow()
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn empty_model_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "ai_brain:\n  model_name: \"\"\n");
    selflow()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] ai_brain.model_name is empty"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn config_path_from_env() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "context_management:\n  max_history: 0\n");
    selflow()
        .env("SELFLOW_CONFIG", &path)
        .args(["config", "validate", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_history is 0"));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    selflow()
        .args(["config", "validate", "--config"])
        .arg(dir.path().join("nope.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn show_applies_overrides() {
    let output = selflow()
        .args(["config", "show", "--json", "--model", "mistral:7b"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["ai_brain"]["model_name"], "mistral:7b");
    assert_eq!(json["context_management"]["max_history"], 20);
}

// ---------------------------------------------------------------------------
// selflow health / status without a generation server
// ---------------------------------------------------------------------------

#[test]
fn health_reports_stopped_brain_as_json() {
    let output = selflow()
        .args(["health", "--json", "--base-url", DEAD_OLLAMA])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["central_brain_running"], false);
    assert_eq!(json["generation_healthy"], false);
    assert_eq!(json["interaction_count"], 0);
}

#[test]
fn status_reports_offline() {
    selflow()
        .args(["status", "--base-url", DEAD_OLLAMA])
        .assert()
        .success()
        .stdout(predicate::str::contains("Central AI Brain is offline"));
}

#[test]
fn chat_fails_when_brain_cannot_start() {
    selflow()
        .args(["chat", "hello", "--base-url", DEAD_OLLAMA])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to start the central brain"));
}

#[test]
fn command_help_explains_the_controller_requirement() {
    selflow()
        .args(["command", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BrainBuilder::system_controller"));
}

#[test]
fn chat_help_explains_the_agent_fallback() {
    selflow()
        .args(["chat", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BrainBuilder::user_interface"));
}
