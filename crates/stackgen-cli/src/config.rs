//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `STACKGEN__GENERATION__ENGINE=jinja`
//! 3. `.stackgen.toml` in the current directory
//! 4. The user config file (or the `--config` file, which replaces 3 and 4)
//! 5. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat, Source};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use stackgen_core::domain::EngineKind;

use crate::cli::OutputFormat;

/// File name used for project-local configuration.
pub const LOCAL_CONFIG_FILE: &str = ".stackgen.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Generation defaults.
    pub generation: GenerationConfig,
    /// Template sources.
    pub templates: TemplateConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// `handlebars` or `jinja`; used when a template names no engine.
    pub engine: String,
    pub force: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default().as_str().into(),
            force: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Extra template roots, loaded as custom templates.
    pub paths: Vec<PathBuf>,
    /// Load the templates shipped with stackgen.
    pub builtin: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            builtin: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from every source in the module docs.
    ///
    /// `config_file` is the path passed via `--config`; when given, it is the
    /// only file consulted.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match config_file {
            Some(path) => {
                if !path.exists() {
                    warn!(path = %path.display(), "config file not found, using defaults");
                }
                builder = builder.add_source(file_source(path));
            }
            None => {
                builder = builder
                    .add_source(file_source(&Self::config_path(None)))
                    .add_source(file_source(Path::new(LOCAL_CONFIG_FILE)));
            }
        }

        let config = builder
            .add_source(
                Environment::with_prefix("STACKGEN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("templates.paths"),
            )
            .build()?
            .try_deserialize::<Self>()?;

        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Path of the configuration file: `explicit` when given, otherwise the
    /// platform config directory.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.stackgen.toml` in the current directory.
    pub fn config_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        directories::ProjectDirs::from("dev", "stackgen", "stackgen")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// The configured default engine.
    pub fn engine(&self) -> Result<EngineKind, String> {
        self.generation
            .engine
            .parse::<EngineKind>()
            .map_err(|e| format!("generation.engine: {e}"))
    }

    /// The configured output format, `Auto` when unset or unknown.
    pub fn output_format(&self) -> OutputFormat {
        <OutputFormat as clap::ValueEnum>::from_str(&self.output.format, true)
            .unwrap_or_default()
    }
}

fn file_source(path: &Path) -> impl Source + Send + Sync + 'static {
    File::from(path).format(FileFormat::Toml).required(false)
}
