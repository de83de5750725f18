//! Template Registry - discovery and runtime registration.
//!
//! Read side for listing/search UIs plus `register` for user-supplied
//! templates. Kept apart from [`Generator`](super::Generator), which is the
//! only mutating use case on output.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::{
    application::ports::{TemplateEntry, TemplateStore},
    domain::{Framework, Language, ServiceType, Template, TemplateQuery},
    error::StackgenResult,
};

/// Information about a template for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub description: String,
    pub languages: Vec<Language>,
    /// Empty when the template does not narrow by framework.
    pub frameworks: Vec<Framework>,
    /// Number of declared files.
    pub files: usize,
    /// Number of declared dependencies.
    pub dependencies: usize,
    pub builtin: bool,
}

impl From<&TemplateEntry> for TemplateInfo {
    fn from(entry: &TemplateEntry) -> Self {
        let t = &entry.template;
        Self {
            name: t.name.clone(),
            service_type: t.service_type,
            description: t.description.clone().unwrap_or_default(),
            languages: t.supported_languages.clone(),
            frameworks: t.supported_frameworks.clone(),
            files: t.files.len(),
            dependencies: t.dependencies.len(),
            builtin: entry.builtin,
        }
    }
}

/// Service for template discovery.
pub struct TemplateRegistry {
    store: Arc<dyn TemplateStore>,
}

impl TemplateRegistry {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self { store }
    }

    /// Every registered template, in registration order.
    pub fn get_all_templates(&self) -> StackgenResult<Vec<TemplateInfo>> {
        Ok(self.store.all()?.iter().map(TemplateInfo::from).collect())
    }

    /// Templates satisfying every filter set in `query`.
    pub fn search_templates(&self, query: &TemplateQuery) -> StackgenResult<Vec<TemplateInfo>> {
        Ok(self
            .store
            .search(query)?
            .iter()
            .map(TemplateInfo::from)
            .collect())
    }

    /// The template `generate` would use for this combination.
    pub fn find(
        &self,
        service_type: ServiceType,
        language: Language,
        framework: Option<Framework>,
    ) -> StackgenResult<Option<Arc<Template>>> {
        self.store.find(service_type, language, framework)
    }

    /// Add or replace (by name) a custom template.
    pub fn register(&self, template: Template) -> StackgenResult<()> {
        info!(template = %template.name, "Registering custom template");
        self.store.register(template, false)
    }
}
