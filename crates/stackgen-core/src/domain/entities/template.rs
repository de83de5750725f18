// ============================================================================
// template.rs - Template Domain Model
// ============================================================================

//! A template is a named bundle of source files, inclusion conditions,
//! dependency declarations and scripts for one service type and a set of
//! languages (optionally narrowed to frameworks).
//!
//! ## Lifecycle
//!
//! Built once (by the filesystem loader or programmatically through
//! [`TemplateBuilder`]), shared as `Arc<Template>`, never mutated.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::error::TemplateError;
use crate::domain::value_objects::{EngineKind, Framework, Language, ServiceType};

/// Extensions copied byte-for-byte instead of rendered.
pub const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "pdf", "zip", "tar", "gz", "tgz",
    "bz2", "xz", "7z", "rar", "jar", "war", "woff", "woff2", "ttf", "otf", "eot", "exe", "dll",
    "so", "dylib", "bin", "class", "pyc", "wasm", "mp3", "mp4", "wav", "ogg", "avi", "mov",
];

/// Whether `path` has one of [`BINARY_EXTENSIONS`] (case-insensitive).
pub fn is_binary_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            BINARY_EXTENSIONS
                .iter()
                .any(|b| b.eq_ignore_ascii_case(ext))
        })
}

// ============================================================================
// Template
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub description: Option<String>,
    /// Never empty.
    pub supported_languages: Vec<Language>,
    /// Empty means the template does not narrow by framework.
    pub supported_frameworks: Vec<Framework>,
    pub files: Vec<TemplateFile>,
    pub dependencies: Vec<TemplateDependency>,
    pub scripts: BTreeMap<String, String>,
    /// Partial name → source path relative to `root`.
    pub partials: BTreeMap<String, PathBuf>,
    /// Syntax of this template's sources; `None` uses the generator default.
    pub engine: Option<EngineKind>,
    /// Directory the template's source paths are relative to.
    #[serde(skip)]
    pub root: PathBuf,
}

impl Template {
    pub fn builder(name: impl Into<String>, service_type: ServiceType) -> TemplateBuilder {
        TemplateBuilder::new(name, service_type)
    }

    pub fn supports_language(&self, language: Language) -> bool {
        self.supported_languages.contains(&language)
    }

    pub fn supports_framework(&self, framework: Framework) -> bool {
        self.supported_frameworks.contains(&framework)
    }

    /// Whether the template declares no framework restriction.
    pub fn is_framework_agnostic(&self) -> bool {
        self.supported_frameworks.is_empty()
    }

    /// Fallback-tier match: same type, supported language and, only when a
    /// framework is requested, a supported framework.
    pub fn matches(
        &self,
        service_type: ServiceType,
        language: Language,
        framework: Option<Framework>,
    ) -> bool {
        self.service_type == service_type
            && self.supports_language(language)
            && framework.is_none_or(|fw| self.supports_framework(fw))
    }

    /// Absolute source path of a template-relative path.
    pub fn source_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}

/// One file the template produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateFile {
    /// Output-relative path; rendered through the engine before use.
    pub path: String,
    /// Source path relative to the template root.
    pub template: PathBuf,
    pub condition: Option<String>,
    pub binary: bool,
}

impl TemplateFile {
    /// Text file; binary-ness inferred from the source extension.
    pub fn new(path: impl Into<String>, template: impl Into<PathBuf>) -> Self {
        let template = template.into();
        let binary = is_binary_path(&template);
        Self {
            path: path.into(),
            template,
            condition: None,
            binary,
        }
    }

    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateDependency {
    pub name: String,
    pub version: String,
    pub dev: bool,
    pub condition: Option<String>,
}

impl TemplateDependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dev: false,
            condition: None,
        }
    }

    pub fn dev(mut self) -> Self {
        self.dev = true;
        self
    }

    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

// ============================================================================
// Query
// ============================================================================

/// Discovery filter; every supplied field must match (AND semantics).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateQuery {
    pub service_type: Option<ServiceType>,
    pub language: Option<Language>,
    pub framework: Option<Framework>,
}

impl TemplateQuery {
    pub fn matches(&self, template: &Template) -> bool {
        self.service_type.is_none_or(|t| template.service_type == t)
            && self.language.is_none_or(|l| template.supports_language(l))
            && self.framework.is_none_or(|f| template.supports_framework(f))
    }
}

// ============================================================================
// Builder
// ============================================================================

#[derive(Debug)]
pub struct TemplateBuilder {
    template: Template,
}

impl TemplateBuilder {
    fn new(name: impl Into<String>, service_type: ServiceType) -> Self {
        Self {
            template: Template {
                name: name.into(),
                service_type,
                description: None,
                supported_languages: Vec::new(),
                supported_frameworks: Vec::new(),
                files: Vec::new(),
                dependencies: Vec::new(),
                scripts: BTreeMap::new(),
                partials: BTreeMap::new(),
                engine: None,
                root: PathBuf::new(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.template.description = Some(description.into());
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        if !self.template.supported_languages.contains(&language) {
            self.template.supported_languages.push(language);
        }
        self
    }

    pub fn framework(mut self, framework: Framework) -> Self {
        if !self.template.supported_frameworks.contains(&framework) {
            self.template.supported_frameworks.push(framework);
        }
        self
    }

    pub fn file(mut self, file: TemplateFile) -> Self {
        self.template.files.push(file);
        self
    }

    pub fn dependency(mut self, dependency: TemplateDependency) -> Self {
        self.template.dependencies.push(dependency);
        self
    }

    pub fn script(mut self, name: impl Into<String>, command: impl Into<String>) -> Self {
        self.template.scripts.insert(name.into(), command.into());
        self
    }

    pub fn partial(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.template.partials.insert(name.into(), path.into());
        self
    }

    pub fn engine(mut self, engine: EngineKind) -> Self {
        self.template.engine = Some(engine);
        self
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.template.root = root.into();
        self
    }

    /// # Errors
    ///
    /// `InvalidTemplate` when the name is blank or no language is supported.
    pub fn build(self) -> Result<Template, TemplateError> {
        let t = self.template;
        if t.name.trim().is_empty() {
            return Err(TemplateError::invalid("<unnamed>", "name must not be empty"));
        }
        if t.supported_languages.is_empty() {
            return Err(TemplateError::invalid(
                &t.name,
                "supportedLanguages must not be empty",
            ));
        }
        Ok(t)
    }
}
