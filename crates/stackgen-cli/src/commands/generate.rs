//! Implementation of the `stackgen generate` command.
//!
//! Responsibility: read and validate the description, wire the adapters into
//! a [`Generator`], and display the report. No business logic lives here.

use std::{path::PathBuf, sync::Arc};

use tracing::{debug, info, instrument};

use stackgen_adapters::{DefaultEngineProvider, LocalFilesystem};
use stackgen_core::{
    application::Generator,
    domain::{ConfigValidator, GenerationOptions, GenerationReport},
};

use crate::{
    cli::{GenerateArgs, GlobalArgs},
    commands::{load_store, read_description},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `stackgen generate` command.
///
/// Dispatch sequence:
/// 1. Read and validate the description
/// 2. Load templates (built-ins plus custom roots)
/// 3. Generate with the engine default from flags or config
/// 4. Print the report (or JSON in `--output-format json`)
#[instrument(skip_all, fields(description = %args.description.display()))]
pub fn execute(
    args: GenerateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    // 1. Description
    let raw = read_description(&args.description)?;
    let description = ConfigValidator::new().validate(&raw)?;
    debug!(
        service = %description.name(),
        language = %description.language(),
        service_type = %description.service_type(),
        "description validated"
    );

    // 2. Adapters
    let engine = match args.engine {
        Some(kind) => kind,
        None => config.engine().map_err(CliError::config)?,
    };
    let filesystem = Arc::new(LocalFilesystem::new());
    let store = load_store(filesystem.clone(), &args.sources, &config)?;
    let engines =
        Arc::new(DefaultEngineProvider::new(filesystem.clone()).with_default(engine));
    let generator = Generator::new(store, engines, filesystem);

    // 3. Generate
    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(description.name()));
    let options = GenerationOptions::new(&output_path)
        .force(args.force || config.generation.force)
        .dry_run(args.dry_run)
        .verbose(global.verbose > 0);

    info!(path = %output_path.display(), %engine, "generation started");
    let spinner = output.spinner(format!("Generating '{}'...", description.name()));
    let result = generator.generate(&description, options);
    spinner.finish_and_clear();
    if result.is_err() && !output.is_json() {
        output.error(&format!("Generation of '{}' failed", description.name()))?;
    }
    let report = result?;

    // 4. Report
    if output.is_json() {
        output.json(&report)?;
        return Ok(());
    }

    if report.dry_run {
        print_dry_run(&report, &output_path, &output)?;
    } else {
        print_summary(&report, &output_path, description.name(), &output)?;
    }
    Ok(())
}

fn print_dry_run(
    report: &GenerationReport,
    output_path: &std::path::Path,
    output: &OutputManager,
) -> CliResult<()> {
    output.info(&format!(
        "Dry run: template '{}' would write {} file(s) to {}",
        report.template,
        report.files.len(),
        output_path.display(),
    ))?;
    for file in &report.files {
        output.print(&format!("  {} ({} bytes)", file.path.as_str(), file.content.len()))?;
    }
    print_dependencies(report, output)
}

fn print_summary(
    report: &GenerationReport,
    output_path: &std::path::Path,
    name: &str,
    output: &OutputManager,
) -> CliResult<()> {
    output.success(&format!(
        "Generated '{name}' from template '{}' ({} file(s))",
        report.template,
        report.written.len(),
    ))?;
    for file in &report.files {
        output.print(&format!("  {}", file.path.as_str()))?;
    }
    print_dependencies(report, output)?;

    output.print("")?;
    output.print("Next steps:")?;
    output.print(&format!("  cd {}", output_path.display()))?;
    Ok(())
}

fn print_dependencies(report: &GenerationReport, output: &OutputManager) -> CliResult<()> {
    if report.dependencies.is_empty() {
        return Ok(());
    }
    output.header("Dependencies:")?;
    for (name, version) in &report.dependencies.production {
        output.print(&format!("  {name} {version}"))?;
    }
    for (name, version) in &report.dependencies.development {
        output.print(&format!("  {name} {version} (dev)"))?;
    }
    Ok(())
}
