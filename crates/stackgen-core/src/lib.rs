//! stackgen Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the stackgen
//! service generator, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           stackgen-cli (CLI)            │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │    (Generator, TemplateRegistry)        │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, TemplateStore, RenderEngine│
//! │          EngineProvider)                │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   stackgen-adapters (Infrastructure)    │
//! │ (LocalFilesystem, InMemoryTemplateStore,│
//! │  HandlebarsEngine, JinjaEngine)         │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (ServiceDescription, ConfigValidator,   │
//! │  Template, conditions, helpers)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stackgen_core::prelude::*;
//! use serde_json::json;
//!
//! // 1. Validate raw input
//! let description = ConfigValidator::new().validate(&json!({
//!     "name": "billing-api",
//!     "version": "0.1.0",
//!     "type": "API",
//!     "language": "go"
//! }))?;
//!
//! // 2. Use application service (with injected adapters)
//! let generator = Generator::new(store, engines, filesystem);
//! let report = generator.generate(&description, GenerationOptions::new("./out"))?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Generator, TemplateInfo, TemplateRegistry,
        ports::{EngineProvider, Filesystem, RenderEngine, TemplateStore},
    };
    pub use crate::domain::{
        ConfigValidator, EngineKind, Framework, GenerationContext, GenerationOptions,
        GenerationReport, Helper, HelperRegistry, Language, ServiceDescription, ServiceType,
        Template, TemplateError, TemplateQuery, ValidationError,
    };
    pub use crate::error::{StackgenError, StackgenResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
