//! Unified error handling for stackgen core.
//!
//! Wraps the two error types callers must handle ([`ValidationError`] and
//! [`TemplateError`]) together with orchestration failures, each with
//! user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{self, TemplateError, ValidationError};

/// Root error type for stackgen core operations.
#[derive(Debug, Error, Clone)]
pub enum StackgenError {
    /// The service description is invalid; carries every violation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Template resolution, loading or rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Filesystem or store failure during orchestration.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl StackgenError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Validation(e) => e.suggestions(),
            Self::Template(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Check your config file with: stackgen config list".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in stackgen".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Template(e) => match e.category() {
                domain::ErrorCategory::Validation => ErrorCategory::Validation,
                domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// The core never retries; a poisoned store lock is the only condition
    /// that may clear on a fresh attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::StoreLock))
    }

    /// Field-level violations, when this is a validation failure.
    pub fn field_errors(&self) -> Option<&[domain::FieldError]> {
        match self {
            Self::Validation(e) => Some(&e.errors),
            _ => None,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type StackgenResult<T> = Result<T, StackgenError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> StackgenResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> StackgenResult<T> {
        self.map_err(|e| StackgenError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_template_maps_to_not_found_category() {
        let err: StackgenError = TemplateError::NotFound {
            service_type: "API".into(),
            language: "go".into(),
            framework: None,
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(!err.is_retryable());
    }

    #[test]
    fn validation_exposes_field_errors() {
        let err: StackgenError = ValidationError::single("name", "is required").into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.field_errors().unwrap()[0].field, "name");
        assert!(err.to_string().contains("name: is required"));
    }

    #[test]
    fn io_errors_keep_their_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StackgenError = ApplicationError::filesystem("/x", "write", io).into();
        match &err {
            StackgenError::Application(app) => {
                assert_eq!(app.io_kind(), Some(std::io::ErrorKind::PermissionDenied));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn context_wraps_foreign_errors_as_internal() {
        let r: Result<(), std::fmt::Error> = Err(std::fmt::Error);
        let err = r.context("formatting").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.to_string().contains("formatting"));
    }
}
