//! Subcommand handlers.
//!
//! Each handler translates parsed arguments into calls on the core services
//! and formats the result. The helpers below are shared by the handlers that
//! read descriptions or need a populated template store.

pub mod completions;
pub mod config;
pub mod generate;
pub mod init;
pub mod list;
pub mod render;
pub mod validate;

use std::{path::Path, sync::Arc};

use serde_json::Value;
use tracing::{debug, info, instrument};

use stackgen_adapters::{FilesystemTemplateLoader, InMemoryTemplateStore, LocalFilesystem};
use stackgen_core::application::ports::Filesystem;

use crate::{
    cli::TemplateSourceArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
};

/// Read a description file: `.json` as JSON, anything else as YAML.
pub(crate) fn read_description(path: &Path) -> CliResult<Value> {
    let raw = std::fs::read_to_string(path)
        .with_cli_context(|| format!("Failed to read description '{}'", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str::<Value>(&raw).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| CliError::DescriptionParse {
        path: path.to_path_buf(),
        reason,
    })
}

/// Build a store holding the built-in templates (unless disabled) and every
/// custom root from config and flags; custom templates shadow built-ins.
#[instrument(skip_all)]
pub(crate) fn load_store(
    filesystem: Arc<LocalFilesystem>,
    sources: &TemplateSourceArgs,
    config: &AppConfig,
) -> CliResult<Arc<InMemoryTemplateStore>> {
    let store = Arc::new(InMemoryTemplateStore::new());

    let builtin = config.templates.builtin && !sources.no_builtin;
    if builtin {
        let count = store.load_builtin(filesystem.clone())?;
        debug!(count, "built-in templates registered");
    }

    let roots: Vec<_> = config
        .templates
        .paths
        .iter()
        .chain(&sources.templates)
        .cloned()
        .collect();

    for root in &roots {
        if !filesystem.is_dir(root) {
            return Err(CliError::InvalidInput {
                message: format!("template directory '{}' does not exist", root.display()),
                source: None,
            });
        }
    }

    let custom = FilesystemTemplateLoader::new(filesystem).load_into(store.as_ref(), &roots, false)?;
    info!(custom, total = store.len(), "template store ready");

    if store.is_empty() {
        return Err(CliError::NoTemplates { searched: roots });
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn json_and_yaml_descriptions_parse() {
        let dir = TempDir::new().unwrap();
        let json = write(&dir, "svc.json", r#"{"name": "a", "version": "1.0.0"}"#);
        let yaml = write(&dir, "svc.yaml", "name: a\nversion: 1.0.0\n");

        assert_eq!(read_description(&json).unwrap()["name"], "a");
        assert_eq!(read_description(&yaml).unwrap()["version"], "1.0.0");
    }

    #[test]
    fn unknown_extension_falls_back_to_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "svc.txt", "name: a\n");
        assert_eq!(read_description(&path).unwrap()["name"], "a");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "svc.json", "{ nope");
        assert!(matches!(
            read_description(&path),
            Err(CliError::DescriptionParse { .. })
        ));
    }

    #[test]
    fn missing_description_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_description(&dir.path().join("absent.yaml")).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn store_without_any_template_is_an_error() {
        let dir = TempDir::new().unwrap();
        let sources = TemplateSourceArgs {
            templates: vec![dir.path().to_path_buf()],
            no_builtin: true,
        };
        let err = load_store(Arc::new(LocalFilesystem::new()), &sources, &AppConfig::default())
            .unwrap_err();
        assert!(matches!(err, CliError::NoTemplates { .. }));
    }

    #[test]
    fn missing_template_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        let sources = TemplateSourceArgs {
            templates: vec![dir.path().join("nowhere")],
            no_builtin: true,
        };
        let err = load_store(Arc::new(LocalFilesystem::new()), &sources, &AppConfig::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
