//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not business
//! rules. Validation and template failures are domain errors from
//! `crate::domain`.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A filesystem operation failed. The original I/O error is kept as the
    /// source so callers can inspect its kind.
    #[error("failed to {operation} {path}: {source}")]
    Filesystem {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: Arc<io::Error>,
    },

    /// A destination file exists and `force` was not set.
    #[error("output file already exists: {path}")]
    OutputExists { path: PathBuf },

    /// Store access failed (lock poisoned).
    #[error("template store lock poisoned")]
    StoreLock,

    /// Best-effort cleanup after a failed write did not complete.
    #[error("rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },
}

impl ApplicationError {
    pub fn filesystem(path: impl Into<PathBuf>, operation: &'static str, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            operation,
            source: Arc::new(source),
        }
    }

    /// The underlying I/O error kind, for filesystem failures.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Filesystem { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Filesystem { path, source, .. } => match source.kind() {
                io::ErrorKind::PermissionDenied => vec![
                    format!("Permission denied: {}", path.display()),
                    "Check that you have write permissions".into(),
                ],
                io::ErrorKind::NotFound => vec![
                    format!("Not found: {}", path.display()),
                    "Ensure the path exists".into(),
                ],
                _ => vec![format!("Failed to access: {}", path.display())],
            },
            Self::OutputExists { path } => vec![
                format!("File already exists: {}", path.display()),
                "Use --force to overwrite (destructive)".into(),
                "Or choose a different output directory with --output".into(),
            ],
            Self::StoreLock => vec![
                "The template store is in an inconsistent state".into(),
                "Restart the process".into(),
            ],
            Self::RollbackFailed { path, .. } => vec![
                format!("Remove {} manually", path.display()),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::OutputExists { .. } => ErrorCategory::Validation,
            Self::Filesystem { .. } | Self::StoreLock | Self::RollbackFailed { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}
