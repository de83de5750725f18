//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `stackgen-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File reads, writes and directory scans
//!   - `TemplateStore`: Indexed template lookup and registration
//!   - `RenderEngine`: One template syntax with its helper/partial registry
//!   - `EngineProvider`: Creates a fresh `RenderEngine` per generation request
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - `Generator` and `TemplateRegistry` services

pub mod output;

pub use output::{DirEntry, EngineProvider, Filesystem, RenderEngine, TemplateEntry, TemplateStore};

#[cfg(test)]
pub use output::{MockEngineProvider, MockFilesystem, MockRenderEngine, MockTemplateStore};
