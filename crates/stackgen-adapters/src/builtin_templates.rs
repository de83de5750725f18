//! Built-in template discovery.
//!
//! [`all_templates`] is the single entry-point for loading the templates that
//! ship with stackgen, so callers do not need to know where they live on disk.
//!
//! # Template resolution order
//!
//! Candidates are probed in this order, stopping at the first directory that
//! yields at least one valid template:
//!
//! 1. **`$STACKGEN_TEMPLATES_DIR`**: environment override.
//! 2. **`./templates`**: relative to the current working directory.
//! 3. **`<executable-dir>/templates`**: sibling to the `stackgen` binary.
//! 4. **`../templates`**: one level above CWD, handy under `target/debug/`.
//!
//! If nothing is found, [`all_templates`] returns an empty `Vec` and logs a
//! `WARN`. The CLI turns that into an actionable message.

use std::{path::PathBuf, sync::Arc};

use tracing::{debug, info, instrument, warn};

use stackgen_core::{application::ports::Filesystem, domain::Template, error::StackgenResult};

use crate::template_loader::FilesystemTemplateLoader;

/// Environment variable naming an explicit built-in templates directory.
pub const TEMPLATES_DIR_ENV: &str = "STACKGEN_TEMPLATES_DIR";

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the built-in templates using the resolution order in the module docs.
///
/// # Errors
///
/// Only when a candidate directory exists but cannot be listed. Individual
/// templates that fail to parse are skipped with a warning.
#[instrument(skip(filesystem))]
pub fn all_templates(filesystem: Arc<dyn Filesystem>) -> StackgenResult<Vec<Template>> {
    let loader = FilesystemTemplateLoader::new(filesystem.clone());

    for candidate in candidate_paths() {
        debug!(path = %candidate.display(), "checking candidate templates path");

        if !filesystem.is_dir(&candidate) {
            debug!(path = %candidate.display(), "not a directory, skipping");
            continue;
        }

        let templates = loader.load_all(&candidate)?;
        if templates.is_empty() {
            debug!(
                path = %candidate.display(),
                "directory exists but contains no templates, trying next"
            );
            continue;
        }

        info!(
            path  = %candidate.display(),
            count = templates.len(),
            "built-in templates loaded"
        );
        return Ok(templates);
    }

    warn!(
        "no templates directory found; checked ${TEMPLATES_DIR_ENV}, \
         ./templates, <exe>/templates, and ../templates"
    );
    Ok(vec![])
}

// ── Resolution helpers ────────────────────────────────────────────────────────

fn candidate_paths() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from));
    candidates_from(std::env::var(TEMPLATES_DIR_ENV).ok(), exe_dir)
}

/// Ordered candidates; a blank override and an unknown exe dir are omitted.
fn candidates_from(env_dir: Option<String>, exe_dir: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(4);

    if let Some(dir) = env_dir.filter(|d| !d.trim().is_empty()) {
        paths.push(PathBuf::from(dir));
    }
    paths.push(PathBuf::from("templates"));
    if let Some(exe_dir) = exe_dir {
        paths.push(exe_dir.join("templates"));
    }
    paths.push(PathBuf::from("../templates"));

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_comes_first() {
        let paths = candidates_from(Some("/custom".into()), Some(PathBuf::from("/usr/bin")));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/custom"),
                PathBuf::from("templates"),
                PathBuf::from("/usr/bin/templates"),
                PathBuf::from("../templates"),
            ]
        );
    }

    #[test]
    fn blank_override_and_unknown_exe_are_skipped() {
        let paths = candidates_from(Some("  ".into()), None);
        assert_eq!(
            paths,
            vec![PathBuf::from("templates"), PathBuf::from("../templates")]
        );
    }
}
