//! Filesystem-based template loader.
//!
//! Discovers template directories (those containing a descriptor file) below
//! one or more roots and converts each descriptor into a domain [`Template`].
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── go/
//! │   └── gin-api/
//! │       ├── template.yaml    ← descriptor (required)
//! │       ├── main.go.hbs
//! │       └── go.mod.hbs
//! └── typescript-express/
//!     ├── template.json
//!     └── src/
//!         └── index.ts.hbs
//! ```
//!
//! Discovery is an explicit worklist: a directory holding a descriptor is a
//! template and is never searched further, any other directory has its
//! subdirectories queued. A descriptor that fails to parse or validate is
//! logged at WARN and skipped.
//!
//! # Descriptor format
//!
//! ```yaml
//! name: go-gin-api                # required
//! type: API                       # required
//! supportedLanguages: [go]        # required, non-empty
//! supportedFrameworks: [gin]      # optional
//! description: Gin REST API       # optional
//! engine: handlebars              # optional: handlebars | jinja
//! files:                          # optional, see below
//!   - path: "cmd/{{snakeCase name}}/main.go"
//!     template: main.go.hbs
//!     condition: featureFlags.grpc
//!     binary: false
//! dependencies:
//!   - { name: github.com/gin-gonic/gin, version: v1.10.0, dev: false }
//! scripts: { start: "go run ." }
//! partials: { header: partials/header.hbs }
//! ```
//!
//! When `files` is omitted, every file in the directory except the
//! descriptor and declared partials becomes a text file whose output path
//! drops a trailing `.hbs`, `.j2`, `.jinja` or `.tmpl`.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use stackgen_core::{
    application::{
        ApplicationError,
        ports::{DirEntry, Filesystem, TemplateStore},
    },
    domain::{
        EngineKind, Framework, Language, RelativePath, ServiceType, Template, TemplateDependency,
        TemplateError, TemplateFile,
    },
    error::StackgenResult,
};

/// Descriptor file names, in lookup priority order.
pub const DESCRIPTOR_FILES: [&str; 3] = ["template.json", "template.yaml", "template.yml"];

/// Source suffixes stripped from auto-discovered output paths.
pub const TEMPLATE_SUFFIXES: [&str; 4] = [".hbs", ".j2", ".jinja", ".tmpl"];

// ── Descriptor types ──────────────────────────────────────────────────────────

/// Deserialised template descriptor (JSON or YAML).
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub description: Option<String>,
    pub supported_languages: Vec<String>,
    #[serde(default)]
    pub supported_frameworks: Vec<String>,
    #[serde(default)]
    pub engine: Option<String>,
    /// `None` means "every file in the directory".
    #[serde(default)]
    pub files: Option<Vec<FileEntry>>,
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
    #[serde(default)]
    pub partials: BTreeMap<String, String>,
}

/// One entry under `files`.
#[derive(Debug, Deserialize, Clone)]
pub struct FileEntry {
    pub path: String,
    pub template: String,
    #[serde(default)]
    pub condition: Option<String>,
    /// Inferred from the source extension when absent.
    #[serde(default)]
    pub binary: Option<bool>,
}

/// One entry under `dependencies`.
#[derive(Debug, Deserialize, Clone)]
pub struct DependencyEntry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub dev: bool,
    #[serde(default)]
    pub condition: Option<String>,
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`Template`] objects from directory trees through the
/// [`Filesystem`] port.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use stackgen_adapters::{FilesystemTemplateLoader, LocalFilesystem};
///
/// let loader = FilesystemTemplateLoader::new(Arc::new(LocalFilesystem::new()));
/// let templates = loader.load_all("./templates")?;
/// println!("Loaded {} templates", templates.len());
/// # Ok::<(), stackgen_core::error::StackgenError>(())
/// ```
pub struct FilesystemTemplateLoader {
    filesystem: Arc<dyn Filesystem>,
}

impl FilesystemTemplateLoader {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Load every valid template below `root`, in path order.
    ///
    /// # Errors
    ///
    /// Fails only if `root` itself is not a readable directory. Unreadable
    /// subdirectories and bad descriptors are skipped with a `WARN` log.
    #[instrument(skip(self, root), fields(root = %root.as_ref().display()))]
    pub fn load_all(&self, root: impl AsRef<Path>) -> StackgenResult<Vec<Template>> {
        let root = root.as_ref();
        if !self.filesystem.is_dir(root) {
            return Err(ApplicationError::filesystem(
                root,
                "read templates directory",
                io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            )
            .into());
        }

        let mut templates = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let entries = match self.filesystem.list_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if dir == root => return Err(e),
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                    continue;
                }
            };

            if let Some(descriptor) = find_descriptor(&entries) {
                match self.load_template(&dir, descriptor) {
                    Ok(template) => {
                        debug!(template = %template.name, dir = %dir.display(), "loaded template");
                        templates.push(template);
                    }
                    Err(e) => {
                        // One bad template must not block all others.
                        warn!(
                            dir   = %dir.display(),
                            error = %e,
                            "skipping template directory due to load error"
                        );
                    }
                }
                continue;
            }

            // Reverse so the stack pops subdirectories in path order.
            pending.extend(
                entries
                    .iter()
                    .rev()
                    .filter(|e| e.is_dir)
                    .map(|e| e.path.clone()),
            );
        }

        debug!(count = templates.len(), "finished loading templates");
        Ok(templates)
    }

    /// Load every root and register the results; returns how many templates
    /// were registered.
    pub fn load_into(
        &self,
        store: &dyn TemplateStore,
        roots: &[PathBuf],
        builtin: bool,
    ) -> StackgenResult<usize> {
        let mut count = 0;
        for root in roots {
            for template in self.load_all(root)? {
                store.register(template, builtin)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Load a single template directory.
    #[instrument(skip(self, descriptor), fields(dir = %dir.display()))]
    pub fn load_template(&self, dir: &Path, descriptor: &Path) -> StackgenResult<Template> {
        let raw = self.filesystem.read_to_string(descriptor)?;
        let parsed = parse_descriptor(descriptor, &raw)?;
        self.build(dir, descriptor, parsed)
    }

    fn build(
        &self,
        dir: &Path,
        descriptor_path: &Path,
        d: TemplateDescriptor,
    ) -> StackgenResult<Template> {
        let invalid = |reason: String| TemplateError::InvalidDescriptor {
            path: descriptor_path.display().to_string(),
            reason,
        };

        let service_type = d
            .service_type
            .parse::<ServiceType>()
            .map_err(|e| invalid(e.to_string()))?;

        if d.supported_languages.is_empty() {
            return Err(invalid("supportedLanguages must not be empty".into()).into());
        }

        let mut builder = Template::builder(&d.name, service_type).root(dir);
        if let Some(description) = &d.description {
            builder = builder.description(description);
        }
        for raw in &d.supported_languages {
            let language = raw
                .parse::<Language>()
                .map_err(|e| invalid(e.to_string()))?;
            builder = builder.language(language);
        }
        for raw in &d.supported_frameworks {
            let framework = raw
                .parse::<Framework>()
                .map_err(|e| invalid(e.to_string()))?;
            builder = builder.framework(framework);
        }
        if let Some(raw) = &d.engine {
            let engine = raw
                .parse::<EngineKind>()
                .map_err(|e| invalid(e.to_string()))?;
            builder = builder.engine(engine);
        }

        for (name, path) in &d.partials {
            let source = self.check_source(dir, path).map_err(invalid)?;
            builder = builder.partial(name, source);
        }

        match &d.files {
            Some(entries) => {
                for entry in entries {
                    let source = self.check_source(dir, &entry.template).map_err(invalid)?;
                    let mut file = TemplateFile::new(&entry.path, source);
                    if let Some(binary) = entry.binary {
                        file = file.binary(binary);
                    }
                    if let Some(condition) = &entry.condition {
                        file = file.when(condition);
                    }
                    builder = builder.file(file);
                }
            }
            None => {
                for file in self.discover_files(dir, &d.partials)? {
                    builder = builder.file(file);
                }
            }
        }

        for dep in &d.dependencies {
            let mut dependency = TemplateDependency::new(&dep.name, &dep.version);
            if dep.dev {
                dependency = dependency.dev();
            }
            if let Some(condition) = &dep.condition {
                dependency = dependency.when(condition);
            }
            builder = builder.dependency(dependency);
        }

        for (name, command) in &d.scripts {
            builder = builder.script(name, command);
        }

        Ok(builder.build()?)
    }

    /// Check that a descriptor-referenced path stays inside `dir` and exists;
    /// returns it normalised and relative.
    fn check_source(&self, dir: &Path, raw: &str) -> Result<PathBuf, String> {
        let relative = RelativePath::try_new(raw)
            .map_err(|_| format!("'{raw}' escapes the template directory"))?;
        if !self.filesystem.exists(&relative.under(dir)) {
            return Err(format!("referenced file '{raw}' does not exist"));
        }
        Ok(relative.as_path().to_path_buf())
    }

    /// Every file below `dir` except descriptors and partial sources.
    fn discover_files(
        &self,
        dir: &Path,
        partials: &BTreeMap<String, String>,
    ) -> StackgenResult<Vec<TemplateFile>> {
        let partial_paths: Vec<PathBuf> = partials
            .values()
            .filter_map(|p| RelativePath::try_new(p).ok())
            .map(|p| p.as_path().to_path_buf())
            .collect();

        let mut files = Vec::new();
        for absolute in self.filesystem.read_dir_recursive(dir)? {
            let Ok(relative) = absolute.strip_prefix(dir) else {
                continue;
            };
            let is_descriptor = relative.parent() == Some(Path::new(""))
                && relative
                    .to_str()
                    .is_some_and(|name| DESCRIPTOR_FILES.contains(&name));
            if is_descriptor || partial_paths.iter().any(|p| p == relative) {
                continue;
            }

            let source = relative.to_string_lossy().replace('\\', "/");
            files.push(TemplateFile::new(output_path_for(&source), relative));
        }
        Ok(files)
    }
}

// ── Free helpers ──────────────────────────────────────────────────────────────

/// The highest-priority descriptor among a directory's entries.
fn find_descriptor(entries: &[DirEntry]) -> Option<&Path> {
    DESCRIPTOR_FILES.iter().find_map(|name| {
        entries
            .iter()
            .find(|e| !e.is_dir && e.path.file_name().is_some_and(|f| f == *name))
            .map(|e| e.path.as_path())
    })
}

/// Parse descriptor text, choosing the format by file extension.
pub fn parse_descriptor(path: &Path, raw: &str) -> Result<TemplateDescriptor, TemplateError> {
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let parsed = if is_json {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(raw).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| TemplateError::InvalidDescriptor {
        path: path.display().to_string(),
        reason,
    })
}

/// Output path for an auto-discovered source: one template suffix removed.
fn output_path_for(source: &str) -> String {
    TEMPLATE_SUFFIXES
        .iter()
        .find_map(|suffix| source.strip_suffix(suffix))
        .filter(|stripped| !stripped.is_empty() && !stripped.ends_with('/'))
        .unwrap_or(source)
        .to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
