//! Infrastructure adapters for stackgen.
//!
//! This crate implements the ports defined in `stackgen-core::application::ports`:
//! local and in-memory filesystems, the indexed template store, the
//! descriptor-driven template loader and the two render engines.

pub mod builtin_templates;
pub mod filesystem;
pub mod renderer;
pub mod template_loader;
pub mod template_store;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::{DefaultEngineProvider, HandlebarsEngine, JinjaEngine};
pub use template_loader::FilesystemTemplateLoader;
pub use template_store::InMemoryTemplateStore;
