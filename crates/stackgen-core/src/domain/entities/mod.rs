pub mod common;
pub mod generation;
pub mod template;

pub use common::RelativePath;
pub use generation::{
    DependencySet, FileContent, GenerationContext, GenerationOptions, GenerationReport,
    RenderedFile,
};
pub use template::{
    Template, TemplateBuilder, TemplateDependency, TemplateFile, TemplateQuery, is_binary_path,
};
