//! Implementation of the `stackgen render` command.
//!
//! Renders one template file to stdout so template authors can iterate
//! without building a full template directory.

use std::{path::Path, sync::Arc};

use serde_json::json;
use tracing::{debug, instrument};

use stackgen_adapters::{DefaultEngineProvider, LocalFilesystem};
use stackgen_core::{
    application::ports::EngineProvider,
    domain::{ConfigValidator, EngineKind, GenerationContext, GenerationOptions},
};

use crate::{
    cli::RenderArgs,
    commands::read_description,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(template = %args.template.display()))]
pub fn execute(args: RenderArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let raw = match &args.description {
        Some(path) => read_description(path)?,
        None => json!({
            "name": "example-service",
            "version": "0.1.0",
            "type": "API",
            "language": "go",
        }),
    };
    let description = ConfigValidator::new().validate(&raw)?;
    let context = GenerationContext::new(&description, &GenerationOptions::new(".").dry_run(true));

    let kind = match args.engine.or_else(|| engine_for_extension(&args.template)) {
        Some(kind) => kind,
        None => config.engine().map_err(CliError::config)?,
    };
    debug!(engine = %kind, "rendering template file");

    let filesystem = Arc::new(LocalFilesystem::new());
    let engine = DefaultEngineProvider::new(filesystem).create(kind)?;
    let rendered = engine.render_file(&args.template, &context)?;

    output.raw(&rendered)?;
    Ok(())
}

/// `.hbs` and `.j2`/`.jinja` name their engine; anything else defers to config.
fn engine_for_extension(path: &Path) -> Option<EngineKind> {
    match path.extension()?.to_str()? {
        "hbs" | "handlebars" => Some(EngineKind::Primary),
        "j2" | "jinja" | "jinja2" => Some(EngineKind::Secondary),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_selects_engine() {
        assert_eq!(engine_for_extension(Path::new("main.go.hbs")), Some(EngineKind::Primary));
        assert_eq!(engine_for_extension(Path::new("Cargo.toml.j2")), Some(EngineKind::Secondary));
        assert_eq!(engine_for_extension(Path::new("a.jinja")), Some(EngineKind::Secondary));
        assert_eq!(engine_for_extension(Path::new("main.go.tmpl")), None);
        assert_eq!(engine_for_extension(Path::new("Makefile")), None);
    }
}
