//! Integration tests for the `stackgen` binary.
//!
//! Every test runs inside its own sandbox: an empty config file, the
//! repository templates as the built-in set and a scratch working directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

// ── fixtures ──────────────────────────────────────────────────────────────────

const GO_SERVICE: &str = "\
name: orders-api
version: 1.0.0
type: API
language: go
framework: gin
";

fn repo_templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "").unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("stackgen").unwrap();
        cmd.current_dir(self.path())
            .env("STACKGEN_CONFIG", self.config())
            .env("STACKGEN_TEMPLATES_DIR", repo_templates())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

// ── help / version ────────────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn version_flag() {
    Sandbox::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_arguments_prints_help_and_fails() {
    Sandbox::new()
        .cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

// ── generate ──────────────────────────────────────────────────────────────────

#[test]
fn generate_writes_go_service() {
    let sandbox = Sandbox::new();
    let description = sandbox.write("service.yaml", GO_SERVICE);
    let out = sandbox.path().join("out");

    sandbox
        .cmd()
        .arg("generate")
        .arg(&description)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("go-gin-api"))
        .stdout(predicate::str::contains("github.com/gin-gonic/gin"));

    let main = fs::read_to_string(out.join("main.go")).unwrap();
    assert!(main.contains("orders_api.Register"), "{main}");
    assert!(out.join("internal/orders_api/handler.go").is_file());
    assert!(out.join("go.mod").is_file());
    // conditional files stay out without their feature
    assert!(!out.join("Dockerfile").exists());
    assert!(!out.join("internal/db/db.go").exists());
}

#[test]
fn generate_defaults_output_to_service_name() {
    let sandbox = Sandbox::new();
    sandbox.write("service.yaml", GO_SERVICE);

    sandbox
        .cmd()
        .args(["gen", "service.yaml"])
        .assert()
        .success();

    assert!(sandbox.path().join("orders-api/main.go").is_file());
}

#[test]
fn generate_refuses_to_overwrite_without_force() {
    let sandbox = Sandbox::new();
    let description = sandbox.write("service.yaml", GO_SERVICE);
    let out = sandbox.path().join("out");
    let run = |force: bool| {
        let mut cmd = sandbox.cmd();
        cmd.arg("generate").arg(&description).arg("-o").arg(&out);
        if force {
            cmd.arg("--force");
        }
        cmd.assert()
    };

    run(false).success();
    run(false)
        .code(2)
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"));
    run(true).success();
}

#[test]
fn dry_run_writes_nothing() {
    let sandbox = Sandbox::new();
    let description = sandbox.write("service.yaml", GO_SERVICE);
    let out = sandbox.path().join("out");

    sandbox
        .cmd()
        .arg("generate")
        .arg(&description)
        .arg("-o")
        .arg(&out)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("main.go"));

    assert!(!out.exists());
}

#[test]
fn json_report_describes_generation() {
    let sandbox = Sandbox::new();
    let description = sandbox.write(
        "service.json",
        r#"{"name":"billing","version":"0.2.0","type":"API","language":"go","framework":"gin",
            "infrastructure":{"docker":true}}"#,
    );

    let assert = sandbox
        .cmd()
        .args(["--output-format", "json", "generate"])
        .arg(&description)
        .arg("--dry-run")
        .assert()
        .success();

    let report: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["template"], "go-gin-api");
    assert_eq!(report["dryRun"], true);
    let paths: Vec<&str> = report["files"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["path"].as_str())
        .collect();
    assert!(paths.contains(&"Dockerfile"), "{paths:?}");
    assert!(paths.contains(&"internal/billing/handler.go"), "{paths:?}");
}

#[test]
fn generate_with_jinja_template() {
    let sandbox = Sandbox::new();
    let description = sandbox.write(
        "service.yaml",
        "name: ledger\nversion: 0.1.0\ntype: API\nlanguage: rust\nframework: axum\n",
    );
    let out = sandbox.path().join("ledger");

    sandbox
        .cmd()
        .arg("generate")
        .arg(&description)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("rust-axum-api"));

    assert!(out.join("Cargo.toml").is_file());
    assert!(out.join("src/main.rs").is_file());
}

#[test]
fn custom_template_shadows_builtin() {
    let sandbox = Sandbox::new();
    sandbox.write(
        "custom/go-api/template.yaml",
        "name: house-go\ntype: API\nsupportedLanguages: [go]\nsupportedFrameworks: [gin]\n\
         files:\n  - path: main.go\n    template: main.go.hbs\n",
    );
    sandbox.write("custom/go-api/main.go.hbs", "package main // {{name}}\n");
    let description = sandbox.write("service.yaml", GO_SERVICE);
    let out = sandbox.path().join("out");

    sandbox
        .cmd()
        .arg("generate")
        .arg(&description)
        .args(["-T", "custom", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("house-go"));

    assert_eq!(
        fs::read_to_string(out.join("main.go")).unwrap(),
        "package main // orders-api\n"
    );
}

// ── list ──────────────────────────────────────────────────────────────────────

#[test]
fn list_json_contains_builtins() {
    let sandbox = Sandbox::new();
    let assert = sandbox
        .cmd()
        .args(["list", "--format", "json"])
        .assert()
        .success();

    let templates: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let names: Vec<&str> = templates
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    for expected in ["go-gin-api", "python-fastapi", "rust-axum-api"] {
        assert!(names.contains(&expected), "{names:?}");
    }
}

#[test]
fn list_filters_by_language() {
    Sandbox::new()
        .cmd()
        .args(["ls", "--lang", "go", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("go-gin-api"))
        .stdout(predicate::str::contains("python-fastapi").not());
}

#[test]
fn list_csv_has_header() {
    Sandbox::new()
        .cmd()
        .args(["list", "--format", "csv", "--lang", "python"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("name,type,languages,frameworks,builtin"))
        .stdout(predicate::str::contains("python-fastapi,API,python,fastapi,true"));
}

// ── validate ──────────────────────────────────────────────────────────────────

#[test]
fn validate_accepts_valid_description() {
    let sandbox = Sandbox::new();
    let description = sandbox.write("service.yaml", GO_SERVICE);

    sandbox
        .cmd()
        .arg("validate")
        .arg(&description)
        .assert()
        .success()
        .stdout(predicate::str::contains("'orders-api' is a valid service description"));
}

#[test]
fn validate_partial_accepts_subset() {
    let sandbox = Sandbox::new();
    let description = sandbox.write("partial.yaml", "language: python\nframework: fastapi\n");

    sandbox
        .cmd()
        .arg("validate")
        .arg(&description)
        .arg("--partial")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 field(s)"));
}

// ── render ────────────────────────────────────────────────────────────────────

#[test]
fn render_single_handlebars_file() {
    let sandbox = Sandbox::new();
    let template = sandbox.write("snippet.hbs", "{{pascalCase name}} v{{version}}\n");

    sandbox
        .cmd()
        .arg("render")
        .arg(&template)
        .assert()
        .success()
        .stdout("ExampleService v0.1.0\n");
}

#[test]
fn render_infers_jinja_from_extension() {
    let sandbox = Sandbox::new();
    let template = sandbox.write("snippet.j2", "{{ name | upper }}\n");
    let description = sandbox.write("service.yaml", GO_SERVICE);

    sandbox
        .cmd()
        .arg("render")
        .arg(&template)
        .arg("-d")
        .arg(&description)
        .assert()
        .success()
        .stdout("ORDERS-API\n");
}

// ── init / config ─────────────────────────────────────────────────────────────

#[test]
fn init_local_writes_defaults() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["init", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration created"));

    let text = fs::read_to_string(sandbox.path().join(".stackgen.toml")).unwrap();
    assert!(text.contains("engine = \"handlebars\""), "{text}");

    // a second run leaves the file alone; piped stdin means no prompt
    sandbox
        .cmd()
        .args(["init", "--local"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn config_set_then_get() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["config", "set", "generation.engine", "jinja"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["config", "get", "generation.engine"])
        .assert()
        .success()
        .stdout("jinja\n");

    let text = fs::read_to_string(sandbox.config()).unwrap();
    assert!(text.contains("jinja"), "{text}");
}

#[test]
fn config_path_honours_flag() {
    let sandbox = Sandbox::new();
    let custom = sandbox.path().join("elsewhere.toml");

    sandbox
        .cmd()
        .arg("--config")
        .arg(&custom)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("elsewhere.toml"));
}

#[test]
fn environment_overrides_config_file() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.config(), "[generation]\nengine = \"jinja\"\n").unwrap();

    sandbox
        .cmd()
        .env("STACKGEN__GENERATION__ENGINE", "handlebars")
        .args(["config", "get", "generation.engine"])
        .assert()
        .success()
        .stdout("handlebars\n");
}

// ── completions ───────────────────────────────────────────────────────────────

#[test]
fn completions_for_bash() {
    Sandbox::new()
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stackgen"));
}
