//! Generator - the single mutating entry point.
//!
//! This service coordinates one generation request:
//! 1. Resolve the template for the description's type/language/framework
//! 2. Render every file whose condition holds, merge dependencies
//! 3. Build the package manifest when the language has one
//! 4. Return the files (dry run) or write them, rolling back on failure
//!
//! Everything is rendered before anything is written, so a render failure
//! never leaves partial output behind.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{EngineProvider, Filesystem, RenderEngine, TemplateStore},
    },
    domain::{
        DependencySet, FileContent, GenerationContext, GenerationOptions, GenerationReport,
        RelativePath, RenderedFile, ServiceDescription, Template, TemplateError, capabilities,
        condition, inflection,
    },
    error::StackgenResult,
};

/// Main generation service.
pub struct Generator {
    store: Arc<dyn TemplateStore>,
    engines: Arc<dyn EngineProvider>,
    filesystem: Arc<dyn Filesystem>,
}

impl Generator {
    /// Create a generator over the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use stackgen_core::application::Generator;
    ///
    /// let generator = Generator::new(
    ///     store,      // Arc<dyn TemplateStore>
    ///     engines,    // Arc<dyn EngineProvider>
    ///     filesystem, // Arc<dyn Filesystem>
    /// );
    /// ```
    pub fn new(
        store: Arc<dyn TemplateStore>,
        engines: Arc<dyn EngineProvider>,
        filesystem: Arc<dyn Filesystem>,
    ) -> Self {
        Self {
            store,
            engines,
            filesystem,
        }
    }

    /// Generate a service from a validated description.
    ///
    /// # Errors
    ///
    /// - `TemplateError::NotFound` when no template matches
    /// - `TemplateError::Render` / `UnsafeOutputPath` / `Manifest` while rendering
    /// - `ApplicationError::OutputExists` when a destination exists and `force` is off
    /// - `ApplicationError::Filesystem` for I/O failures, propagated unchanged
    #[instrument(
        skip_all,
        fields(
            service = %description.name(),
            output_path = %options.output_path.display(),
            dry_run = options.dry_run
        )
    )]
    pub fn generate(
        &self,
        description: &ServiceDescription,
        options: GenerationOptions,
    ) -> StackgenResult<GenerationReport> {
        info!(
            "Generating {} {} service",
            description.language(),
            description.service_type()
        );

        // 1. Resolve template
        let template = self.resolve(description)?;
        info!(template = %template.name, "Template resolved");

        // 2. Render
        let engine = self.prepare_engine(&template)?;
        let context = GenerationContext::new(description, &options);
        let mut files = self.render_files(&template, engine.as_ref(), &context)?;
        let dependencies = merge_dependencies(&template, &context);

        // 3. Manifest
        let manifest = match capabilities::package_manifest_for(description.language()) {
            Some(file_name) => Some(attach_manifest(
                file_name,
                &template,
                description,
                &dependencies,
                &mut files,
            )?),
            None => None,
        };

        let mut report = GenerationReport {
            template: template.name.clone(),
            files,
            dependencies,
            manifest,
            dry_run: options.dry_run,
            written: Vec::new(),
        };

        // 4. Output
        if options.dry_run {
            info!(files = report.files.len(), "Dry run, nothing written");
            return Ok(report);
        }

        report.written = self.write_output(&report.files, &options)?;
        info!(files = report.written.len(), "Generation completed");
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn resolve(&self, description: &ServiceDescription) -> StackgenResult<Arc<Template>> {
        let found = self.store.find(
            description.service_type(),
            description.language(),
            description.framework(),
        )?;

        found.ok_or_else(|| {
            TemplateError::NotFound {
                service_type: description.service_type().to_string(),
                language: description.language().to_string(),
                framework: description.framework().map(|f| f.to_string()),
            }
            .into()
        })
    }

    /// Fresh engine for this request with the template's partials registered.
    fn prepare_engine(&self, template: &Template) -> StackgenResult<Box<dyn RenderEngine>> {
        let kind = template
            .engine
            .unwrap_or_else(|| self.engines.default_kind());
        let mut engine = self.engines.create(kind)?;

        for (name, path) in &template.partials {
            let source = self.filesystem.read_to_string(&template.source_path(path))?;
            engine.register_partial(name, &source)?;
        }

        debug!(engine = %kind, partials = template.partials.len(), "Engine ready");
        Ok(engine)
    }

    fn render_files(
        &self,
        template: &Template,
        engine: &dyn RenderEngine,
        context: &GenerationContext,
    ) -> StackgenResult<Vec<RenderedFile>> {
        let mut seen = HashSet::new();
        let mut files = Vec::with_capacity(template.files.len());

        for file in &template.files {
            if !holds(file.condition.as_deref(), context) {
                debug!(file = %file.path, condition = ?file.condition, "Condition false, skipping file");
                continue;
            }

            let rendered_path = engine.render(&file.path, &file.path, context)?;
            let path = RelativePath::try_new(&rendered_path)?;
            if !seen.insert(path.clone()) {
                return Err(TemplateError::invalid(
                    &template.name,
                    format!("more than one file renders to '{path}'"),
                )
                .into());
            }

            let source = template.source_path(&file.template);
            let content = if file.binary {
                FileContent::Binary(self.filesystem.read_bytes(&source)?)
            } else {
                let text = self.filesystem.read_to_string(&source)?;
                let name = file.template.display().to_string();
                FileContent::Text(engine.render(&name, &text, context)?)
            };

            debug!(path = %path, bytes = content.len(), binary = content.is_binary(), "Rendered file");
            files.push(RenderedFile { path, content });
        }

        Ok(files)
    }

    fn write_output(
        &self,
        files: &[RenderedFile],
        options: &GenerationOptions,
    ) -> StackgenResult<Vec<PathBuf>> {
        let root = options.output_path.as_path();

        if !options.force {
            let clash = files
                .iter()
                .map(|f| f.path.under(root))
                .find(|dest| self.filesystem.exists(dest));
            if let Some(path) = clash {
                return Err(ApplicationError::OutputExists { path }.into());
            }
        }

        let mut created = Vec::new();
        match self.write_all(files, root, &mut created) {
            Ok(written) => Ok(written),
            Err(e) => {
                warn!(error = %e, created = created.len(), "Write failed, rolling back");
                self.rollback(&created);
                Err(e)
            }
        }
    }

    /// Write every file. Paths that did not exist beforehand are recorded in
    /// `created` before their write starts.
    fn write_all(
        &self,
        files: &[RenderedFile],
        root: &Path,
        created: &mut Vec<PathBuf>,
    ) -> StackgenResult<Vec<PathBuf>> {
        self.filesystem.create_dir_all(root)?;

        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let dest = file.path.under(root);
            if let Some(parent) = dest.parent() {
                self.filesystem.create_dir_all(parent)?;
            }

            if !self.filesystem.exists(&dest) {
                created.push(dest.clone());
            }

            match &file.content {
                FileContent::Text(text) => self.filesystem.write_file(&dest, text)?,
                FileContent::Binary(bytes) => self.filesystem.write_bytes(&dest, bytes)?,
            }
            debug!(path = %dest.display(), "Wrote file");
            written.push(dest);
        }

        Ok(written)
    }

    /// Best-effort removal of files created by this run, newest first.
    /// Overwritten files cannot be restored.
    fn rollback(&self, created: &[PathBuf]) {
        for path in created.iter().rev() {
            if !self.filesystem.exists(path) {
                continue;
            }
            if let Err(e) = self.filesystem.remove_file(path) {
                let failure = ApplicationError::RollbackFailed {
                    path: path.clone(),
                    reason: e.to_string(),
                };
                warn!(error = %failure, "Rollback incomplete");
            }
        }
    }
}

/// Absent conditions always hold.
fn holds(expression: Option<&str>, context: &GenerationContext) -> bool {
    expression.is_none_or(|expr| condition::evaluate(expr, context.data()))
}

fn merge_dependencies(template: &Template, context: &GenerationContext) -> DependencySet {
    let mut set = DependencySet::default();
    for dep in &template.dependencies {
        if holds(dep.condition.as_deref(), context) {
            set.insert(&dep.name, &dep.version, dep.dev);
        } else {
            debug!(dependency = %dep.name, condition = ?dep.condition, "Condition false, skipping dependency");
        }
    }
    set
}

/// Build the manifest and put it into `files`, replacing a template-rendered
/// manifest at the same path.
fn attach_manifest(
    file_name: &str,
    template: &Template,
    description: &ServiceDescription,
    dependencies: &DependencySet,
    files: &mut Vec<RenderedFile>,
) -> StackgenResult<RelativePath> {
    let path = RelativePath::try_new(file_name)?;
    let existing = files.iter().position(|f| f.path == path);

    let base = match existing.map(|i| &files[i].content) {
        Some(FileContent::Text(text)) => Some(text.as_str()),
        Some(FileContent::Binary(_)) => {
            return Err(manifest_error(format!("{file_name} must not be a binary file")).into());
        }
        None => None,
    };
    let content = build_manifest(base, template, description, dependencies)?;

    let rendered = RenderedFile {
        path: path.clone(),
        content: FileContent::Text(content),
    };
    match existing {
        Some(i) => files[i] = rendered,
        None => files.push(rendered),
    }
    Ok(path)
}

fn build_manifest(
    base: Option<&str>,
    template: &Template,
    description: &ServiceDescription,
    dependencies: &DependencySet,
) -> Result<String, TemplateError> {
    let mut manifest = match base {
        Some(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(manifest_error("rendered manifest is not a JSON object")),
            Err(e) => return Err(manifest_error(format!("rendered manifest is not valid JSON: {e}"))),
        },
        None => {
            let mut map = Map::new();
            map.insert(
                "name".into(),
                Value::String(inflection::kebab_case(description.name())),
            );
            map.insert("version".into(), description.version().into());
            if let Some(text) = description.description() {
                map.insert("description".into(), text.into());
            }
            map.insert("private".into(), Value::Bool(true));
            map
        }
    };

    evict(&mut manifest, "devDependencies", dependencies.production.keys());
    evict(&mut manifest, "dependencies", dependencies.development.keys());
    overlay(&mut manifest, "scripts", &template.scripts, false)?;
    overlay(&mut manifest, "dependencies", &dependencies.production, true)?;
    overlay(&mut manifest, "devDependencies", &dependencies.development, true)?;

    let mut out = serde_json::to_string_pretty(&Value::Object(manifest))
        .map_err(|e| manifest_error(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

/// Drop `names` from the object at `key`, if it is one. A declared package
/// lives in exactly one dependency section.
fn evict<'a>(
    manifest: &mut Map<String, Value>,
    key: &str,
    names: impl IntoIterator<Item = &'a String>,
) {
    if let Some(Value::Object(existing)) = manifest.get_mut(key) {
        for name in names {
            existing.remove(name);
        }
    }
}

/// Merge `entries` into the object at `key`, keeping the key's position.
fn overlay(
    manifest: &mut Map<String, Value>,
    key: &str,
    entries: &BTreeMap<String, String>,
    sort: bool,
) -> Result<(), TemplateError> {
    let slot = manifest
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(existing) = slot else {
        return Err(manifest_error(format!("'{key}' must be an object")));
    };

    for (name, value) in entries {
        existing.insert(name.clone(), Value::String(value.clone()));
    }
    if sort {
        let sorted: BTreeMap<String, Value> = std::mem::take(existing).into_iter().collect();
        existing.extend(sorted);
    }
    Ok(())
}

fn manifest_error(reason: impl Into<String>) -> TemplateError {
    TemplateError::Manifest {
        reason: reason.into(),
    }
}
