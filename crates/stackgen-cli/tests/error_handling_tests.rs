//! Tests for error reporting: messages, suggestions and exit codes.

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn stackgen(dir: &Path) -> Command {
    let templates = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates");
    let config = dir.join("config.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }

    let mut cmd = Command::cargo_bin("stackgen").unwrap();
    cmd.current_dir(dir)
        .env("STACKGEN_CONFIG", config)
        .env("STACKGEN_TEMPLATES_DIR", templates)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn invalid_description_lists_every_field() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bad.yaml"),
        "name: 9lives\nversion: one\ntype: API\nlanguage: go\nframework: django\nextra: 1\n",
    )
    .unwrap();

    stackgen(dir.path())
        .args(["validate", "bad.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid service description"))
        .stderr(predicate::str::contains("name:"))
        .stderr(predicate::str::contains("version:"))
        .stderr(predicate::str::contains("framework:"))
        .stderr(predicate::str::contains("extra: unknown field"));
}

#[test]
fn generate_validates_before_touching_disk() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.yaml"), "name: svc\ntype: API\nlanguage: go\n").unwrap();

    stackgen(dir.path())
        .args(["generate", "bad.yaml", "-o", "out"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("version: is required"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn malformed_description_is_user_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.json"), "{\"name\": ").unwrap();

    stackgen(dir.path())
        .args(["validate", "broken.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("broken.json"));
}

#[test]
fn missing_description_is_not_found() {
    let dir = TempDir::new().unwrap();

    stackgen(dir.path())
        .args(["generate", "nowhere.yaml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("nowhere.yaml"));
}

#[test]
fn no_template_for_combination_is_not_found() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("worker.yaml"),
        "name: jobs\nversion: 1.0.0\ntype: Worker\nlanguage: java\n",
    )
    .unwrap();

    stackgen(dir.path())
        .args(["generate", "worker.yaml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no template found"));

    assert!(!dir.path().join("jobs").exists());
}

#[test]
fn no_builtin_without_custom_roots_reports_empty_store() {
    let dir = TempDir::new().unwrap();

    stackgen(dir.path())
        .args(["list", "--no-builtin"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("STACKGEN_TEMPLATES_DIR"));
}

#[test]
fn missing_template_root_is_user_error() {
    let dir = TempDir::new().unwrap();

    stackgen(dir.path())
        .args(["list", "-T", "does-not-exist"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does-not-exist"));
}

#[test]
fn unknown_config_key_is_config_error() {
    let dir = TempDir::new().unwrap();

    stackgen(dir.path())
        .args(["config", "get", "generation.colour"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn unknown_engine_in_config_is_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "[generation]\nengine = \"erb\"\n").unwrap();
    fs::write(
        dir.path().join("svc.yaml"),
        "name: svc\nversion: 1.0.0\ntype: API\nlanguage: go\nframework: gin\n",
    )
    .unwrap();

    stackgen(dir.path())
        .args(["generate", "svc.yaml", "--dry-run"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("generation.engine"));
}

#[test]
fn malformed_config_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "[generation\nengine = ").unwrap();

    stackgen(dir.path())
        .args(["config", "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let dir = TempDir::new().unwrap();

    stackgen(dir.path())
        .arg("scaffold")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn render_error_carries_template_name() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.hbs"), "{{#if name}}never closed").unwrap();

    stackgen(dir.path())
        .args(["render", "broken.hbs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.hbs"));
}
