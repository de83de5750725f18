//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.
//!
//! Service types, languages, frameworks and engines are parsed with the
//! core crate's `FromStr` impls, so aliases such as `ts` or `golang` behave
//! exactly as they do inside a service description.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use stackgen_core::domain::{EngineKind, Framework, Language, ServiceType};

pub mod global;
pub use global::{GlobalArgs, LogFormat, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stackgen",
    bin_name = "stackgen",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Service scaffolding from a declarative description",
    long_about = "stackgen validates a service description (JSON or YAML), picks the \
                  best matching template and renders a ready-to-run service skeleton.",
    after_help = "EXAMPLES:\n\
        \x20 stackgen generate service.yaml -o ./billing-api\n\
        \x20 stackgen validate service.json\n\
        \x20 stackgen list --lang go\n\
        \x20 stackgen completions bash > /usr/share/bash-completion/completions/stackgen",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a service from a description file.
    #[command(
        visible_alias = "gen",
        about = "Generate a service from a description",
        after_help = "EXAMPLES:\n\
            \x20 stackgen generate service.yaml\n\
            \x20 stackgen generate service.json -o ./out --force\n\
            \x20 stackgen generate service.yaml --dry-run --output-format json\n\
            \x20 stackgen generate service.yaml -T ./my-templates --no-builtin"
    )]
    Generate(GenerateArgs),

    /// Validate a description file without generating anything.
    #[command(
        about = "Validate a service description",
        after_help = "EXAMPLES:\n\
            \x20 stackgen validate service.yaml\n\
            \x20 stackgen validate patch.json --partial"
    )]
    Validate(ValidateArgs),

    /// List available templates.
    #[command(
        visible_alias = "ls",
        about = "List available templates",
        after_help = "EXAMPLES:\n\
            \x20 stackgen list\n\
            \x20 stackgen list --lang go\n\
            \x20 stackgen list --type API --framework fastapi --format json"
    )]
    List(ListArgs),

    /// Render a single template file, for template authors.
    #[command(
        about = "Render one template file to stdout",
        after_help = "EXAMPLES:\n\
            \x20 stackgen render templates/go/gin-api/main.go.hbs\n\
            \x20 stackgen render Cargo.toml.j2 --description service.yaml"
    )]
    Render(RenderArgs),

    /// Initialise a stackgen configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 stackgen init           # user config location\n\
            \x20 stackgen init --local   # .stackgen.toml in CWD"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stackgen completions bash > ~/.local/share/bash-completion/completions/stackgen\n\
            \x20 stackgen completions zsh  > ~/.zfunc/_stackgen\n\
            \x20 stackgen completions fish > ~/.config/fish/completions/stackgen.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the stackgen configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stackgen config get generation.engine\n\
            \x20 stackgen config set generation.engine jinja\n\
            \x20 stackgen config list"
    )]
    Config(ConfigCommands),
}

// ── shared ────────────────────────────────────────────────────────────────────

/// Where templates are loaded from.
#[derive(Debug, Clone, Default, Args)]
pub struct TemplateSourceArgs {
    /// Extra template roots; their templates shadow built-ins.
    #[arg(
        short = 'T',
        long = "templates",
        value_name = "DIR",
        help = "Additional template directory (repeatable)"
    )]
    pub templates: Vec<PathBuf>,

    /// Do not load the built-in templates.
    #[arg(long = "no-builtin", help = "Skip built-in templates")]
    pub no_builtin: bool,
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `stackgen generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Service description (JSON or YAML).
    #[arg(value_name = "DESCRIPTION", help = "Service description file")]
    pub description: PathBuf,

    /// Output directory; defaults to `./<name>`.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory (default: ./<service name>)"
    )]
    pub output: Option<PathBuf>,

    /// Overwrite files that already exist.
    #[arg(long = "force", help = "Overwrite existing files")]
    pub force: bool,

    /// Compute the output without writing anything.
    #[arg(long = "dry-run", help = "Show what would be created without creating")]
    pub dry_run: bool,

    /// Engine for templates that do not name one.
    #[arg(
        long = "engine",
        value_name = "ENGINE",
        help = "Default template engine: handlebars | jinja"
    )]
    pub engine: Option<EngineKind>,

    #[command(flatten)]
    pub sources: TemplateSourceArgs,
}

// ── validate ──────────────────────────────────────────────────────────────────

/// Arguments for `stackgen validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Service description (JSON or YAML).
    #[arg(value_name = "DESCRIPTION", help = "Service description file")]
    pub description: PathBuf,

    /// Accept any subset of fields.
    #[arg(long = "partial", help = "Validate as a partial description (patch)")]
    pub partial: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `stackgen list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Filter by service type.
    #[arg(short = 't', long = "type", value_name = "TYPE", help = "Filter by service type")]
    pub service_type: Option<ServiceType>,

    /// Filter by language.
    #[arg(short = 'l', long = "lang", value_name = "LANGUAGE", help = "Filter by language")]
    pub language: Option<Language>,

    /// Filter by framework.
    #[arg(
        short = 'f',
        long = "framework",
        value_name = "FRAMEWORK",
        help = "Filter by framework"
    )]
    pub framework: Option<Framework>,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,

    #[command(flatten)]
    pub sources: TemplateSourceArgs,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── render ────────────────────────────────────────────────────────────────────

/// Arguments for `stackgen render`.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template file to render.
    #[arg(value_name = "TEMPLATE_FILE", help = "Template file to render")]
    pub template: PathBuf,

    /// Description providing the context; a placeholder is used otherwise.
    #[arg(
        short = 'd',
        long = "description",
        value_name = "FILE",
        help = "Service description used as render context"
    )]
    pub description: Option<PathBuf>,

    /// Engine; inferred from the file extension when omitted.
    #[arg(
        long = "engine",
        value_name = "ENGINE",
        help = "Template engine: handlebars | jinja"
    )]
    pub engine: Option<EngineKind>,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `stackgen init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.stackgen.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stackgen completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `stackgen config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `generation.engine`.
        key: String,
    },
    /// Set a configuration key to a value.
    Set {
        /// Dotted key path.
        key: String,
        /// New value; lists are comma separated.
        value: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_command() {
        let cli = Cli::parse_from([
            "stackgen",
            "generate",
            "svc.yaml",
            "-o",
            "out",
            "--force",
            "--engine",
            "jinja",
            "-T",
            "a",
            "-T",
            "b",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected Generate command");
        };
        assert_eq!(args.description, PathBuf::from("svc.yaml"));
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert!(args.force);
        assert!(!args.dry_run);
        assert_eq!(args.engine, Some(EngineKind::Secondary));
        assert_eq!(args.sources.templates, vec![PathBuf::from("a"), PathBuf::from("b")]);
    }

    #[test]
    fn list_filters_accept_aliases() {
        let cli = Cli::parse_from(["stackgen", "ls", "-l", "ts", "-t", "api", "-f", "express"]);
        let Commands::List(args) = cli.command else {
            panic!("expected List command");
        };
        assert_eq!(args.language, Some(Language::TypeScript));
        assert_eq!(args.service_type, Some(ServiceType::Api));
        assert_eq!(args.framework, Some(Framework::Express));
        assert_eq!(args.format, ListFormat::Table);
    }

    #[test]
    fn unknown_engine_is_rejected() {
        let result = Cli::try_parse_from(["stackgen", "generate", "svc.yaml", "--engine", "erb"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["stackgen", "--quiet", "--verbose", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::parse_from(["stackgen", "list", "-vv", "--log-format", "json"]);
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.log_format, LogFormat::Json);
    }
}
