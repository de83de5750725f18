//! Render engines and the provider that builds them.
//!
//! Each [`RenderEngine`] instance speaks one syntax for its whole life and
//! owns its helper and partial tables. The generator asks the provider for a
//! fresh engine per generation, so partials never leak between templates.

mod hbs;
mod jinja;

pub use hbs::HandlebarsEngine;
pub use jinja::JinjaEngine;

use std::sync::Arc;

use tracing::debug;

use stackgen_core::{
    application::ports::{EngineProvider, Filesystem, RenderEngine},
    domain::{EngineKind, Helper, HelperRegistry, TemplateError},
};

/// Builds engines pre-loaded with the built-in helpers plus any custom ones.
pub struct DefaultEngineProvider {
    filesystem: Arc<dyn Filesystem>,
    helpers: HelperRegistry,
    default: EngineKind,
}

impl DefaultEngineProvider {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self {
            filesystem,
            helpers: HelperRegistry::builtin(),
            default: EngineKind::default(),
        }
    }

    /// Engine used for templates whose descriptor names none.
    pub fn with_default(mut self, kind: EngineKind) -> Self {
        self.default = kind;
        self
    }

    /// Add a helper to every engine created afterwards; replaces a built-in
    /// of the same name.
    pub fn register_helper(&mut self, name: impl Into<String>, helper: Helper) {
        self.helpers.register(name, helper);
    }

    pub fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }
}

impl EngineProvider for DefaultEngineProvider {
    fn create(&self, kind: EngineKind) -> Result<Box<dyn RenderEngine>, TemplateError> {
        debug!(engine = %kind, helpers = self.helpers.len(), "creating render engine");
        let engine: Box<dyn RenderEngine> = match kind {
            EngineKind::Primary => Box::new(HandlebarsEngine::new(
                Arc::clone(&self.filesystem),
                &self.helpers,
            )),
            EngineKind::Secondary => Box::new(JinjaEngine::new(
                Arc::clone(&self.filesystem),
                &self.helpers,
            )),
        };
        Ok(engine)
    }

    fn default_kind(&self) -> EngineKind {
        self.default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFilesystem;
    use serde_json::json;
    use stackgen_core::domain::GenerationContext;

    fn provider() -> DefaultEngineProvider {
        DefaultEngineProvider::new(Arc::new(MemoryFilesystem::new()))
    }

    #[test]
    fn creates_the_requested_kind() {
        let p = provider();
        assert_eq!(p.default_kind(), EngineKind::Primary);
        assert_eq!(p.create(EngineKind::Primary).unwrap().kind(), EngineKind::Primary);
        assert_eq!(p.create(EngineKind::Secondary).unwrap().kind(), EngineKind::Secondary);
        assert_eq!(
            provider().with_default(EngineKind::Secondary).default_kind(),
            EngineKind::Secondary
        );
    }

    #[test]
    fn custom_helpers_reach_both_engines() {
        let mut p = provider();
        p.register_helper("upperCase", Helper::inline(|_| Ok(json!("custom"))));
        let ctx = GenerationContext::from_value(json!({"name": "x"}));

        let hbs = p.create(EngineKind::Primary).unwrap();
        assert_eq!(hbs.render("t", "{{upperCase name}}", &ctx).unwrap(), "custom");

        let jinja = p.create(EngineKind::Secondary).unwrap();
        assert_eq!(jinja.render("t", "{{ name | upperCase }}", &ctx).unwrap(), "custom");
    }

    #[test]
    fn engines_do_not_share_partials() {
        let p = provider();
        let mut first = p.create(EngineKind::Primary).unwrap();
        first.register_partial("p", "one").unwrap();

        let second = p.create(EngineKind::Primary).unwrap();
        let ctx = GenerationContext::from_value(json!({}));
        assert!(second.render("t", "{{> p}}", &ctx).is_err());
    }
}
