// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for stackgen.
//!
//! Pure logic over values: validating service descriptions, evaluating
//! condition expressions, case conversion and inflection, the helper surface
//! shared by render engines, and the template model. All I/O and template
//! engines live behind ports in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Immutable entities**: Descriptions and templates are never mutated after construction
//!
pub mod capabilities;
pub mod condition;
pub mod entities;
pub mod error;
pub mod helpers;
pub mod inflection;
pub mod service;
pub mod validation;
pub mod value_objects;

pub use entities::{
    DependencySet, FileContent, GenerationContext, GenerationOptions, GenerationReport,
    RelativePath, RenderedFile, Template, TemplateBuilder, TemplateDependency, TemplateFile,
    TemplateQuery, is_binary_path,
};

pub use error::{ErrorCategory, FieldError, TemplateError, ValidationError};

pub use helpers::{Helper, HelperError, HelperRegistry, SwitchFrame};

pub use service::{
    ApiConfig, ApiStyle, CiProvider, CloudProvider, DatabaseConfig, DatabaseKind, Feature,
    InfrastructureConfig, PartialServiceDescription, ServiceDescription,
};

pub use validation::ConfigValidator;

pub use value_objects::{EngineKind, Framework, Language, ParseVariantError, ServiceType};
