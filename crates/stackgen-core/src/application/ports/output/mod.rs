//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stackgen-adapters` crate provides implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::{
    EngineKind, Framework, GenerationContext, Helper, Language, ServiceType, Template,
    TemplateError, TemplateQuery,
};
use crate::error::StackgenResult;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `stackgen_adapters::filesystem::LocalFilesystem` (production)
/// - `stackgen_adapters::filesystem::MemoryFilesystem` (testing)
///
/// I/O failures surface as `ApplicationError::Filesystem` carrying the
/// original `io::Error`. Nothing is retried.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> StackgenResult<String>;

    fn read_bytes(&self, path: &Path) -> StackgenResult<Vec<u8>>;

    /// Immediate children of a directory, sorted by path.
    fn list_dir(&self, path: &Path) -> StackgenResult<Vec<DirEntry>>;

    /// Every file (not directory) below `path`, sorted.
    fn read_dir_recursive(&self, path: &Path) -> StackgenResult<Vec<PathBuf>>;

    /// Write text, creating or truncating the file.
    fn write_file(&self, path: &Path, content: &str) -> StackgenResult<()>;

    fn write_bytes(&self, path: &Path, content: &[u8]) -> StackgenResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StackgenResult<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn remove_file(&self, path: &Path) -> StackgenResult<()>;
}

/// A stored template and whether it was registered as built-in.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateEntry {
    pub template: Arc<Template>,
    pub builtin: bool,
}

/// Port for template storage and retrieval.
///
/// Single writer, many readers: `register` must not race an in-flight
/// `find`/`search`, which implementations enforce with a lock.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateStore: Send + Sync {
    /// Add a template, replacing any template with the same name, and
    /// re-index.
    fn register(&self, template: Template, builtin: bool) -> StackgenResult<()>;

    /// Best match for the request, or `None` when no tier matches.
    fn find(
        &self,
        service_type: ServiceType,
        language: Language,
        framework: Option<Framework>,
    ) -> StackgenResult<Option<Arc<Template>>>;

    /// Every template satisfying all filters of `query`, in registration order.
    fn search(&self, query: &TemplateQuery) -> StackgenResult<Vec<TemplateEntry>>;

    /// Every registered template, in registration order.
    fn all(&self) -> StackgenResult<Vec<TemplateEntry>>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `stackgen_adapters::renderer::HandlebarsEngine` (`EngineKind::Primary`)
/// - `stackgen_adapters::renderer::JinjaEngine` (`EngineKind::Secondary`)
///
/// Helpers and partials may only be registered before the first render;
/// afterwards registration fails with `TemplateError::RegistryFrozen`.
#[cfg_attr(test, mockall::automock)]
pub trait RenderEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    fn register_helper(&mut self, name: &str, helper: Helper) -> Result<(), TemplateError>;

    fn register_partial(&mut self, name: &str, source: &str) -> Result<(), TemplateError>;

    /// Render `source`; `name` identifies it in error messages.
    fn render(
        &self,
        name: &str,
        source: &str,
        context: &GenerationContext,
    ) -> Result<String, TemplateError>;

    /// Read `path` and render its content.
    fn render_file(&self, path: &Path, context: &GenerationContext) -> StackgenResult<String>;
}

/// Creates render engines pre-loaded with the shared helper surface.
#[cfg_attr(test, mockall::automock)]
pub trait EngineProvider: Send + Sync {
    fn create(&self, kind: EngineKind) -> Result<Box<dyn RenderEngine>, TemplateError>;

    /// Engine used for templates that do not name one.
    fn default_kind(&self) -> EngineKind;
}
