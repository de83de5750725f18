//! Application layer for stackgen.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (Generator, TemplateRegistry)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    Generator,
    TemplateInfo, // DTO for template metadata
    TemplateRegistry,
};

// Re-export port traits (for adapter implementation)
pub use ports::{DirEntry, EngineProvider, Filesystem, RenderEngine, TemplateEntry, TemplateStore};

pub use error::ApplicationError;
