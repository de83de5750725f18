//! Implementation of the `stackgen list` command.

use std::sync::Arc;

use tracing::instrument;

use stackgen_adapters::LocalFilesystem;
use stackgen_core::{
    application::{TemplateInfo, TemplateRegistry},
    domain::TemplateQuery,
};

use crate::{
    cli::{ListArgs, ListFormat},
    commands::load_store,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let store = load_store(Arc::new(LocalFilesystem::new()), &args.sources, &config)?;
    let registry = TemplateRegistry::new(store);

    let query = TemplateQuery {
        service_type: args.service_type,
        language: args.language,
        framework: args.framework,
    };
    let templates = registry.search_templates(&query)?;

    // --output-format json wins over the table default
    let format = if output.is_json() {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Table => {
            if templates.is_empty() {
                output.warning("No templates match the given filters")?;
                return Ok(());
            }
            output.header("Available Templates:")?;
            for t in &templates {
                output.print(&format!(
                    "  {:<24} {:<12} {:<24} {:<20} {}",
                    t.name,
                    t.service_type.to_string(),
                    join(&t.languages, ", "),
                    frameworks(t, ", "),
                    if t.builtin { "built-in" } else { "custom" },
                ))?;
            }
        }

        // written even with --quiet
        ListFormat::Json => output.json(&templates)?,

        ListFormat::List => {
            for t in &templates {
                output.raw(&format!("{}\n", t.name))?;
            }
        }

        ListFormat::Csv => {
            output.raw("name,type,languages,frameworks,builtin\n")?;
            for t in &templates {
                output.raw(&format!(
                    "{},{},{},{},{}\n",
                    t.name,
                    t.service_type,
                    join(&t.languages, ";"),
                    frameworks(t, ";"),
                    t.builtin
                ))?;
            }
        }
    }

    Ok(())
}

fn join<T: ToString>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

fn frameworks(t: &TemplateInfo, sep: &str) -> String {
    if t.frameworks.is_empty() {
        "any".into()
    } else {
        join(&t.frameworks, sep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackgen_core::domain::{Framework, Language, ServiceType};

    fn info(frameworks: Vec<Framework>) -> TemplateInfo {
        TemplateInfo {
            name: "t".into(),
            service_type: ServiceType::Api,
            description: String::new(),
            languages: vec![Language::TypeScript, Language::JavaScript],
            frameworks,
            files: 1,
            dependencies: 0,
            builtin: true,
        }
    }

    #[test]
    fn framework_column_defaults_to_any() {
        assert_eq!(frameworks(&info(vec![]), ";"), "any");
        assert_eq!(
            frameworks(&info(vec![Framework::Express, Framework::Koa]), ";"),
            "express;koa"
        );
    }

    #[test]
    fn join_uses_display_forms() {
        assert_eq!(join(&info(vec![]).languages, ", "), "typescript, javascript");
    }
}
