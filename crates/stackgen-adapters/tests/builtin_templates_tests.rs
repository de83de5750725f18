//! The templates shipped in the repository's `templates/` directory load and
//! render for representative descriptions.

use std::{path::PathBuf, sync::Arc};

use serde_json::{Value, json};
use tempfile::TempDir;

use stackgen_adapters::{
    DefaultEngineProvider, FilesystemTemplateLoader, InMemoryTemplateStore, LocalFilesystem,
};
use stackgen_core::{
    domain::{ConfigValidator, FileContent, GenerationOptions, GenerationReport},
    prelude::{Generator, TemplateStore},
};

fn shipped_templates() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

fn dry_run(raw: Value) -> GenerationReport {
    let filesystem = Arc::new(LocalFilesystem::new());
    let store = Arc::new(InMemoryTemplateStore::new());
    FilesystemTemplateLoader::new(filesystem.clone())
        .load_into(store.as_ref(), &[shipped_templates()], true)
        .unwrap();
    let engines = Arc::new(DefaultEngineProvider::new(filesystem.clone()));

    let desc = ConfigValidator::new().validate(&raw).unwrap();
    let out = TempDir::new().unwrap();
    Generator::new(store, engines, filesystem)
        .generate(&desc, GenerationOptions::new(out.path().join("svc")).dry_run(true))
        .unwrap()
}

fn text<'a>(report: &'a GenerationReport, path: &str) -> &'a str {
    match report.file(path).map(|f| &f.content) {
        Some(FileContent::Text(s)) => s,
        other => panic!("{path}: unexpected content {other:?}"),
    }
}

#[test]
fn every_shipped_template_loads() {
    let filesystem = Arc::new(LocalFilesystem::new());
    let store = InMemoryTemplateStore::new();
    let count = FilesystemTemplateLoader::new(filesystem)
        .load_into(&store, &[shipped_templates()], true)
        .unwrap();
    assert_eq!(count, 4);
    assert!(store.all().unwrap().iter().all(|e| e.builtin));
}

#[test]
fn go_gin_api_with_postgres() {
    let report = dry_run(json!({
        "name": "billing-api", "version": "0.1.0", "type": "API", "language": "go",
        "framework": "gin",
        "database": {"type": "postgres"},
        "infrastructure": {"docker": true}
    }));

    assert_eq!(report.template, "go-gin-api");
    for path in [
        "go.mod",
        "main.go",
        "internal/billing_api/handler.go",
        "internal/db/db.go",
        "Dockerfile",
        "README.md",
    ] {
        assert!(report.file(path).is_some(), "missing {path}");
    }
    assert!(text(&report, "go.mod").contains("module github.com/example/billing-api"));
    assert!(text(&report, "go.mod").contains("pgx"));
    assert!(text(&report, "main.go").contains("// Code generated by stackgen for billing-api"));
    assert_eq!(report.dependencies.production.len(), 2);
    assert_eq!(report.dependencies.development.len(), 1);
}

#[test]
fn go_without_database_skips_db_files() {
    let report = dry_run(json!({
        "name": "billing-api", "version": "0.1.0", "type": "API", "language": "go"
    }));
    assert!(report.file("internal/db/db.go").is_none());
    assert!(report.file("Dockerfile").is_none());
    assert!(!report.dependencies.production.contains_key("github.com/jackc/pgx/v5"));
}

#[test]
fn python_fastapi_picks_database_url_by_type() {
    let report = dry_run(json!({
        "name": "orders", "version": "1.0.0", "type": "API", "language": "python",
        "framework": "fastapi",
        "database": {"type": "mysql", "port": 3307}
    }));
    let db = text(&report, "app/database.py");
    assert!(db.contains("mysql+pymysql://localhost:3307/orders"), "{db}");
    assert!(!db.contains("postgresql"));
    assert!(!db.contains("sqlite"));
}

#[test]
fn typescript_express_emits_package_manifest() {
    let report = dry_run(json!({
        "name": "OrdersService", "version": "2.0.0", "type": "API", "language": "typescript",
        "framework": "express",
        "features": [{"name": "auth", "enabled": true}]
    }));

    assert!(report.file("src/auth.ts").is_some());
    let manifest: Value = serde_json::from_str(text(&report, "package.json")).unwrap();
    assert_eq!(manifest["name"], "orders-service");
    assert_eq!(manifest["dependencies"]["jsonwebtoken"], "^9.0.0");
    assert_eq!(manifest["scripts"]["start"], "node dist/index.js");
    assert_eq!(manifest["private"], true);
}

#[test]
fn rust_axum_uses_jinja_and_auto_discovered_files() {
    let report = dry_run(json!({
        "name": "edge_proxy", "version": "0.3.0", "type": "API", "language": "rust",
        "framework": "axum"
    }));
    assert!(text(&report, "Cargo.toml").contains("name = \"edge-proxy\""));
    assert!(text(&report, "src/main.rs").contains("EdgeProxy v0.3.0"));
}
