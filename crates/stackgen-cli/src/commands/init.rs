//! `stackgen init`: create a default configuration file.

use std::path::PathBuf;

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::{AppConfig, LOCAL_CONFIG_FILE},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Create a default stackgen configuration file.
pub fn execute(args: InitArgs, global: GlobalArgs, output: OutputManager) -> CliResult<()> {
    output.info("Initialising configuration...")?;

    let config_path = if args.local {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else {
        AppConfig::config_path(global.config.as_deref())
    };

    if config_path.exists() {
        let answer = if args.force {
            None
        } else {
            confirm_overwrite(&config_path)?
        };
        if !should_overwrite(args.force, answer)? {
            output.warning(&format!(
                "Config already exists at {}  (use --force to overwrite)",
                config_path.display(),
            ))?;
            return Ok(());
        }
    }

    let toml = toml::to_string_pretty(&AppConfig::default())
        .with_cli_context(|| "Failed to serialise default config")?;

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }

    std::fs::write(&config_path, &toml).with_cli_context(|| {
        format!("Failed to write config to '{}'", config_path.display())
    })?;

    output.success(&format!(
        "Configuration created at {}",
        config_path.display(),
    ))?;

    Ok(())
}

/// `answer` is `None` when nobody was asked. A declined prompt cancels the
/// command; no prompt leaves the existing file alone.
fn should_overwrite(force: bool, answer: Option<bool>) -> CliResult<bool> {
    match (force, answer) {
        (true, _) | (false, Some(true)) => Ok(true),
        (false, Some(false)) => Err(CliError::Cancelled),
        (false, None) => Ok(false),
    }
}

/// Ask before replacing an existing file; only on an interactive terminal.
#[cfg(feature = "interactive")]
fn confirm_overwrite(path: &std::path::Path) -> CliResult<Option<bool>> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }
    dialoguer::Confirm::new()
        .with_prompt(format!("{} exists. Overwrite?", path.display()))
        .default(false)
        .interact()
        .map(Some)
        .map_err(|e| CliError::InvalidInput {
            message: "could not read confirmation".into(),
            source: Some(Box::new(e)),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm_overwrite(_path: &std::path::Path) -> CliResult<Option<bool>> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn force_overwrites_without_asking() {
        assert!(should_overwrite(true, None).unwrap());
        assert!(should_overwrite(true, Some(false)).unwrap());
    }

    #[test]
    fn accepted_prompt_overwrites() {
        assert!(should_overwrite(false, Some(true)).unwrap());
    }

    #[test]
    fn declined_prompt_cancels() {
        let err = should_overwrite(false, Some(false)).unwrap_err();
        assert!(matches!(err, CliError::Cancelled));
        assert_eq!(err.category(), ErrorCategory::UserError);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn no_prompt_keeps_existing_file() {
        assert!(!should_overwrite(false, None).unwrap());
    }
}
