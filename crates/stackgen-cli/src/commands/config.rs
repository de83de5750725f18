//! `stackgen config`: read and write configuration values.
//!
//! `get` and `list` show the merged configuration (defaults, files and
//! environment). `set` edits only the active file, keeping keys it does not
//! touch, and refuses values that would not load back.

use std::path::Path;

use serde_json::Value as Json;
use toml::{Table, Value};
use tracing::info;

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let path = AppConfig::config_path(global.config.as_deref());

    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            output.raw(&format!("{value}\n"))?;
        }

        ConfigCommands::Set { key, value } => {
            set_config_value(&path, &key, &value)?;
            info!(%key, %value, path = %path.display(), "configuration updated");
            output.success(&format!("Set {key} = {value} in {}", path.display()))?;
        }

        ConfigCommands::List => {
            if output.is_json() {
                output.json(&config)?;
            } else {
                let serialised = toml::to_string_pretty(&config)
                    .with_cli_context(|| "Failed to serialise config")?;
                output.header("Current Configuration:")?;
                output.raw(&serialised)?;
            }
        }

        ConfigCommands::Path => {
            output.raw(&format!("{}\n", path.display()))?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn unknown_key(key: &str) -> CliError {
    CliError::config(format!("Unknown config key: '{key}'"))
}

/// Leaf value at a dotted key; sections are not values.
fn lookup<'a>(root: &'a Json, key: &str) -> Option<&'a Json> {
    key.split('.')
        .try_fold(root, |node, part| node.get(part))
        .filter(|v| !v.is_object())
}

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    let tree = serde_json::to_value(config).map_err(|e| CliError::config(e.to_string()))?;
    match lookup(&tree, key) {
        Some(Json::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(unknown_key(key)),
    }
}

/// Convert `raw` to the shape of the key's default value.
fn parse_value(key: &str, raw: &str) -> CliResult<Value> {
    let defaults = serde_json::to_value(AppConfig::default())
        .map_err(|e| CliError::config(e.to_string()))?;

    match lookup(&defaults, key).ok_or_else(|| unknown_key(key))? {
        Json::Bool(_) => raw
            .parse::<bool>()
            .map(Value::Boolean)
            .map_err(|_| CliError::config(format!("{key} expects true or false, got '{raw}'"))),
        Json::Array(_) => Ok(Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        )),
        _ => Ok(Value::String(raw.to_string())),
    }
}

fn insert_dotted(table: &mut Table, key: &str, value: Value) -> CliResult<()> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let leaf = parts.pop().ok_or_else(|| unknown_key(key))?;

    let mut node = table;
    for part in parts {
        let entry = node
            .entry(part.to_string())
            .or_insert(Value::Table(Table::new()));
        node = entry
            .as_table_mut()
            .ok_or_else(|| CliError::config(format!("'{part}' is not a table")))?;
    }
    node.insert(leaf.to_string(), value);
    Ok(())
}

fn set_config_value(path: &Path, key: &str, raw: &str) -> CliResult<()> {
    let value = parse_value(key, raw)?;

    let mut table = if path.exists() {
        let text = std::fs::read_to_string(path)
            .with_cli_context(|| format!("Failed to read '{}'", path.display()))?;
        toml::from_str::<Table>(&text).map_err(|e| CliError::ConfigError {
            message: format!("'{}' is not valid TOML", path.display()),
            source: Some(Box::new(e)),
        })?
    } else {
        Table::new()
    };
    insert_dotted(&mut table, key, value)?;

    let merged: AppConfig = Value::Table(table.clone())
        .try_into()
        .map_err(|e: toml::de::Error| CliError::ConfigError {
            message: format!("invalid value for {key}"),
            source: Some(Box::new(e)),
        })?;
    merged.engine().map_err(CliError::config)?;

    let text = toml::to_string_pretty(&table).with_cli_context(|| "Failed to serialise config")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }
    std::fs::write(path, text)
        .with_cli_context(|| format!("Failed to write config to '{}'", path.display()))
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn get_known_keys() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "generation.engine").unwrap(), "handlebars");
        assert_eq!(get_config_value(&cfg, "output.no_color").unwrap(), "false");
        assert_eq!(get_config_value(&cfg, "templates.paths").unwrap(), "[]");
    }

    #[test]
    fn get_unknown_key_is_error() {
        let cfg = AppConfig::default();
        assert!(matches!(
            get_config_value(&cfg, "does.not.exist"),
            Err(CliError::ConfigError { .. })
        ));
        // a section is not a value
        assert!(get_config_value(&cfg, "generation").is_err());
    }

    #[test]
    fn values_follow_the_default_shape() {
        assert_eq!(parse_value("generation.force", "true").unwrap(), Value::Boolean(true));
        assert!(parse_value("generation.force", "yes").is_err());
        assert_eq!(
            parse_value("templates.paths", "a, b,").unwrap(),
            Value::Array(vec![Value::String("a".into()), Value::String("b".into())])
        );
        assert_eq!(
            parse_value("output.format", "json").unwrap(),
            Value::String("json".into())
        );
    }

    #[test]
    fn set_preserves_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        set_config_value(&path, "generation.engine", "jinja").unwrap();
        set_config_value(&path, "templates.builtin", "false").unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.generation.engine, "jinja");
        assert!(!cfg.templates.builtin);
        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("output"), "{text}");
    }

    #[test]
    fn set_rejects_unknown_engine() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        assert!(set_config_value(&path, "generation.engine", "erb").is_err());
        assert!(!path.exists());
    }
}
