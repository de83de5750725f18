//! In-memory, indexed template store.
//!
//! Lookup runs three tiers in order:
//! 1. exact `(type, language, framework)` when a framework is requested
//! 2. exact `(type, language)` over framework-agnostic templates
//! 3. linear scan in registration order using [`Template::matches`]
//!
//! The exact index is rebuilt on every `register`: built-ins are indexed
//! first and custom templates after them, so a custom template shadows a
//! built-in with the same key and a later registration shadows an earlier one.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard},
};

use tracing::debug;

use stackgen_core::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateEntry, TemplateStore},
    },
    domain::{Framework, Language, ServiceType, Template, TemplateQuery},
    error::StackgenResult,
};

use crate::builtin_templates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TemplateKey {
    service_type: ServiceType,
    language: Language,
    framework: Option<Framework>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Registration order; replacement by name keeps the original slot.
    entries: Vec<TemplateEntry>,
    index: HashMap<TemplateKey, Arc<Template>>,
}

impl Inner {
    fn reindex(&mut self) {
        self.index.clear();

        let (builtin, custom): (Vec<&TemplateEntry>, Vec<&TemplateEntry>) =
            self.entries.iter().partition(|e| e.builtin);

        for entry in builtin.into_iter().chain(custom) {
            let t = &entry.template;
            for &language in &t.supported_languages {
                if t.is_framework_agnostic() {
                    let key = TemplateKey {
                        service_type: t.service_type,
                        language,
                        framework: None,
                    };
                    self.index.insert(key, Arc::clone(t));
                }
                for &framework in &t.supported_frameworks {
                    let key = TemplateKey {
                        service_type: t.service_type,
                        language,
                        framework: Some(framework),
                    };
                    self.index.insert(key, Arc::clone(t));
                }
            }
        }
    }
}

/// Thread-safe in-memory template store.
///
/// Single writer, many readers: `register` takes the write lock, so it never
/// overlaps an in-flight `find` or `search`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTemplateStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the discovered built-in templates loaded.
    pub fn with_builtin(filesystem: Arc<dyn Filesystem>) -> StackgenResult<Self> {
        let store = Self::new();
        store.load_builtin(filesystem)?;
        Ok(store)
    }

    /// Register every discovered built-in template; returns how many.
    pub fn load_builtin(&self, filesystem: Arc<dyn Filesystem>) -> StackgenResult<usize> {
        let templates = builtin_templates::all_templates(filesystem)?;
        let count = templates.len();
        for template in templates {
            self.register(template, true)?;
        }
        Ok(count)
    }

    /// Get the number of templates.
    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    /// Check if store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> StackgenResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| ApplicationError::StoreLock.into())
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn register(&self, template: Template, builtin: bool) -> StackgenResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLock)?;

        let name = template.name.clone();
        let entry = TemplateEntry {
            template: Arc::new(template),
            builtin,
        };
        match inner.entries.iter().position(|e| e.template.name == name) {
            Some(slot) => {
                debug!(template = %name, builtin, "replacing template");
                inner.entries[slot] = entry;
            }
            None => {
                debug!(template = %name, builtin, "registering template");
                inner.entries.push(entry);
            }
        }

        inner.reindex();
        Ok(())
    }

    fn find(
        &self,
        service_type: ServiceType,
        language: Language,
        framework: Option<Framework>,
    ) -> StackgenResult<Option<Arc<Template>>> {
        let inner = self.read()?;

        // 1. Exact match including framework.
        if let Some(fw) = framework {
            let key = TemplateKey {
                service_type,
                language,
                framework: Some(fw),
            };
            if let Some(t) = inner.index.get(&key) {
                debug!(template = %t.name, tier = 1, "template matched");
                return Ok(Some(Arc::clone(t)));
            }
        }

        // 2. Exact match on a framework-agnostic template.
        let key = TemplateKey {
            service_type,
            language,
            framework: None,
        };
        if let Some(t) = inner.index.get(&key) {
            debug!(template = %t.name, tier = 2, "template matched");
            return Ok(Some(Arc::clone(t)));
        }

        // 3. First registered template that satisfies the request.
        let found = inner
            .entries
            .iter()
            .find(|e| e.template.matches(service_type, language, framework))
            .map(|e| Arc::clone(&e.template));
        if let Some(t) = &found {
            debug!(template = %t.name, tier = 3, "template matched");
        }
        Ok(found)
    }

    fn search(&self, query: &TemplateQuery) -> StackgenResult<Vec<TemplateEntry>> {
        Ok(self
            .read()?
            .entries
            .iter()
            .filter(|e| query.matches(&e.template))
            .cloned()
            .collect())
    }

    fn all(&self) -> StackgenResult<Vec<TemplateEntry>> {
        Ok(self.read()?.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackgen_core::domain::TemplateFile;

    fn template(name: &str, ty: ServiceType, langs: &[Language], fws: &[Framework]) -> Template {
        let mut builder = Template::builder(name, ty).file(TemplateFile::new("README.md", "README.md"));
        for &l in langs {
            builder = builder.language(l);
        }
        for &f in fws {
            builder = builder.framework(f);
        }
        builder.build().unwrap()
    }

    fn name_of(found: Option<Arc<Template>>) -> Option<String> {
        found.map(|t| t.name.clone())
    }

    // ========================================================================
    // Matching tiers
    // ========================================================================

    #[test]
    fn exact_framework_match_wins() {
        let store = InMemoryTemplateStore::new();
        store
            .register(template("go-generic", ServiceType::Api, &[Language::Go], &[]), true)
            .unwrap();
        store
            .register(
                template("go-gin", ServiceType::Api, &[Language::Go], &[Framework::Gin]),
                true,
            )
            .unwrap();

        let found = store
            .find(ServiceType::Api, Language::Go, Some(Framework::Gin))
            .unwrap();
        assert_eq!(name_of(found).as_deref(), Some("go-gin"));
    }

    #[test]
    fn falls_back_to_framework_agnostic_template() {
        let store = InMemoryTemplateStore::new();
        store
            .register(template("go-generic", ServiceType::Api, &[Language::Go], &[]), true)
            .unwrap();
        store
            .register(
                template("go-gin", ServiceType::Api, &[Language::Go], &[Framework::Gin]),
                true,
            )
            .unwrap();

        let found = store
            .find(ServiceType::Api, Language::Go, Some(Framework::Echo))
            .unwrap();
        assert_eq!(name_of(found).as_deref(), Some("go-generic"));

        let found = store.find(ServiceType::Api, Language::Go, None).unwrap();
        assert_eq!(name_of(found).as_deref(), Some("go-generic"));
    }

    #[test]
    fn linear_scan_covers_framework_specific_templates() {
        let store = InMemoryTemplateStore::new();
        store
            .register(
                template("go-echo", ServiceType::Api, &[Language::Go], &[Framework::Echo]),
                true,
            )
            .unwrap();
        store
            .register(
                template("go-gin", ServiceType::Api, &[Language::Go], &[Framework::Gin]),
                true,
            )
            .unwrap();

        let found = store.find(ServiceType::Api, Language::Go, None).unwrap();
        assert_eq!(name_of(found).as_deref(), Some("go-echo"));
    }

    #[test]
    fn never_returns_a_different_type_or_unsupported_framework() {
        let store = InMemoryTemplateStore::new();
        store
            .register(
                template("go-gin", ServiceType::Api, &[Language::Go], &[Framework::Gin]),
                true,
            )
            .unwrap();

        assert!(store.find(ServiceType::Worker, Language::Go, None).unwrap().is_none());
        assert!(store
            .find(ServiceType::Api, Language::Go, Some(Framework::Fiber))
            .unwrap()
            .is_none());
        assert!(store.find(ServiceType::Api, Language::Rust, None).unwrap().is_none());
    }

    #[test]
    fn custom_templates_shadow_builtins() {
        let store = InMemoryTemplateStore::new();
        store
            .register(template("mine", ServiceType::Cli, &[Language::Rust], &[]), false)
            .unwrap();
        store
            .register(template("stock", ServiceType::Cli, &[Language::Rust], &[]), true)
            .unwrap();

        let found = store.find(ServiceType::Cli, Language::Rust, None).unwrap();
        assert_eq!(name_of(found).as_deref(), Some("mine"));
    }

    #[test]
    fn later_registration_wins_among_equals() {
        let store = InMemoryTemplateStore::new();
        store
            .register(template("first", ServiceType::Cli, &[Language::Rust], &[]), false)
            .unwrap();
        store
            .register(template("second", ServiceType::Cli, &[Language::Rust], &[]), false)
            .unwrap();

        let found = store.find(ServiceType::Cli, Language::Rust, None).unwrap();
        assert_eq!(name_of(found).as_deref(), Some("second"));
    }

    // ========================================================================
    // Registration and search
    // ========================================================================

    #[test]
    fn register_replaces_by_name_in_place() {
        let store = InMemoryTemplateStore::new();
        store
            .register(template("a", ServiceType::Api, &[Language::Go], &[]), true)
            .unwrap();
        store
            .register(template("b", ServiceType::Api, &[Language::Python], &[]), true)
            .unwrap();
        store
            .register(template("a", ServiceType::Worker, &[Language::Go], &[]), false)
            .unwrap();

        let all = store.all().unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(all[0].template.name, "a");
        assert_eq!(all[0].template.service_type, ServiceType::Worker);
        assert!(!all[0].builtin);
        assert!(store.find(ServiceType::Api, Language::Go, None).unwrap().is_none());
    }

    #[test]
    fn search_is_conjunctive() {
        let store = InMemoryTemplateStore::new();
        store
            .register(
                template("go-gin", ServiceType::Api, &[Language::Go], &[Framework::Gin]),
                true,
            )
            .unwrap();
        store
            .register(
                template("ts-express", ServiceType::Api, &[Language::TypeScript], &[Framework::Express]),
                true,
            )
            .unwrap();
        store
            .register(template("go-worker", ServiceType::Worker, &[Language::Go], &[]), true)
            .unwrap();

        let by_lang = store
            .search(&TemplateQuery {
                language: Some(Language::Go),
                ..TemplateQuery::default()
            })
            .unwrap();
        assert_eq!(by_lang.len(), 2);

        let both = store
            .search(&TemplateQuery {
                service_type: Some(ServiceType::Api),
                language: Some(Language::Go),
                framework: None,
            })
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].template.name, "go-gin");

        assert_eq!(store.search(&TemplateQuery::default()).unwrap().len(), 3);
    }

    #[test]
    fn concurrent_readers_see_registered_templates() {
        let store = InMemoryTemplateStore::new();
        store
            .register(template("go", ServiceType::Api, &[Language::Go], &[]), true)
            .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .find(ServiceType::Api, Language::Go, None)
                        .unwrap()
                        .is_some()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
