// ============================================================================
// domain/error.rs - VALIDATION AND TEMPLATE ERRORS
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Maximum number of characters of template source carried in a render error.
pub const SNIPPET_LIMIT: usize = 200;

/// One violated constraint on one field of a service description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted/indexed path of the offending field, e.g. `features[1].enabled`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A service description failed validation.
///
/// Always carries every violation found, never just the first. An empty
/// list is never constructed by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Whether any violation concerns `field` (exact path match).
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn suggestions(&self) -> Vec<String> {
        let mut out: Vec<String> = self.errors.iter().map(|e| format!("  • {e}")).collect();
        out.push("Fix the fields above and run the command again".into());
        out
    }
}

fn summarize(errors: &[FieldError]) -> String {
    let details = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} validation error(s): {details}", errors.len())
}

/// Template resolution, loading, or rendering failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    // ========================================================================
    // Resolution
    // ========================================================================
    #[error("no template found for type '{service_type}', language '{language}'{}", framework_suffix(.framework))]
    NotFound {
        service_type: String,
        language: String,
        framework: Option<String>,
    },

    // ========================================================================
    // Loading / registration
    // ========================================================================
    #[error("invalid template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("invalid template descriptor {path}: {reason}")]
    InvalidDescriptor { path: String, reason: String },

    // ========================================================================
    // Rendering
    // ========================================================================
    #[error("failed to render '{template}': {reason}\n  --> {snippet}")]
    Render {
        template: String,
        reason: String,
        snippet: String,
    },

    #[error("cannot register '{name}': rendering has already started on this engine")]
    RegistryFrozen { name: String },

    // ========================================================================
    // Output
    // ========================================================================
    #[error("output path '{path}' escapes the output directory")]
    UnsafeOutputPath { path: String },

    #[error("cannot build package manifest: {reason}")]
    Manifest { reason: String },
}

fn framework_suffix(framework: &Option<String>) -> String {
    framework
        .as_ref()
        .map(|f| format!(", framework '{f}'"))
        .unwrap_or_default()
}

impl TemplateError {
    /// Build a render error, truncating the template source to a bounded snippet.
    pub fn render(template: impl Into<String>, reason: impl Into<String>, source: &str) -> Self {
        Self::Render {
            template: template.into(),
            reason: reason.into(),
            snippet: snippet(source),
        }
    }

    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound {
                service_type,
                language,
                ..
            } => vec![
                format!("No template supports {service_type} services in {language}"),
                "Try: stackgen list to see available templates".into(),
                "Or point --templates at a directory containing a matching template".into(),
            ],
            Self::InvalidDescriptor { path, .. } => vec![
                format!("Check the descriptor at {path}"),
                "Required keys: name, type, supportedLanguages".into(),
            ],
            Self::Render { template, .. } => vec![
                format!("Check the syntax of '{template}'"),
                "Helpers and partials must be registered before rendering".into(),
            ],
            Self::UnsafeOutputPath { .. } => {
                vec!["Template output paths must be relative and must not contain '..'".into()]
            }
            _ => vec!["See the error details above".into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidTemplate { .. }
            | Self::InvalidDescriptor { .. }
            | Self::UnsafeOutputPath { .. }
            | Self::Manifest { .. }
            | Self::Render { .. } => ErrorCategory::Validation,
            Self::RegistryFrozen { .. } => ErrorCategory::Internal,
        }
    }
}

/// Truncate template source to at most [`SNIPPET_LIMIT`] characters.
pub fn snippet(source: &str) -> String {
    let mut chars = source.chars();
    let head: String = chars.by_ref().take(SNIPPET_LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
