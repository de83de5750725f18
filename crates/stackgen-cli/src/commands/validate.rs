//! Implementation of the `stackgen validate` command.

use tracing::instrument;

use stackgen_core::domain::ConfigValidator;

use crate::{
    cli::ValidateArgs,
    commands::read_description,
    error::CliResult,
    output::OutputManager,
};

/// Validate a description; every violation is reported by the error path.
#[instrument(skip_all, fields(description = %args.description.display(), partial = args.partial))]
pub fn execute(args: ValidateArgs, output: OutputManager) -> CliResult<()> {
    let raw = read_description(&args.description)?;
    let validator = ConfigValidator::new();

    if args.partial {
        let patch = validator.validate_partial(&raw)?;
        if output.is_json() {
            output.json(patch.fields())?;
        } else {
            output.success(&format!(
                "Valid partial description ({} field(s))",
                patch.fields().len()
            ))?;
        }
        return Ok(());
    }

    let description = validator.validate(&raw)?;
    if output.is_json() {
        output.json(&description)?;
        return Ok(());
    }

    output.success(&format!(
        "'{}' is a valid service description",
        description.name()
    ))?;
    output.print(&format!("  Type:      {}", description.service_type()))?;
    output.print(&format!("  Language:  {}", description.language()))?;
    if let Some(framework) = description.framework() {
        output.print(&format!("  Framework: {framework}"))?;
    }
    output.print(&format!("  Version:   {}", description.version()))?;
    Ok(())
}
