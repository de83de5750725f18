//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate a service" or "list templates".

pub mod generator;
pub mod template_registry;

pub use generator::Generator;
pub use template_registry::{TemplateInfo, TemplateRegistry};
