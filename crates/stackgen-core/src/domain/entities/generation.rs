//! Per-request generation data: options, the context bag handed to engines
//! and conditions, rendered output, and the final report.

use std::collections::BTreeMap;
use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose};
use chrono::{Datelike, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use super::common::RelativePath;
use crate::domain::inflection;
use crate::domain::service::ServiceDescription;

// ============================================================================
// Options
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationOptions {
    pub output_path: PathBuf,
    /// Overwrite files that already exist at the destination.
    pub force: bool,
    /// Compute output without touching the filesystem.
    pub dry_run: bool,
    pub verbose: bool,
}

impl GenerationOptions {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

// ============================================================================
// Context
// ============================================================================

/// The data bag for one generation run.
///
/// Built fresh per request and never persisted. `project.year` is the only
/// time-dependent value.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationContext {
    data: Value,
}

impl GenerationContext {
    pub fn new(description: &ServiceDescription, options: &GenerationOptions) -> Self {
        Self::with_year(description, options, Utc::now().year())
    }

    /// Build with a fixed `project.year`.
    pub fn with_year(
        description: &ServiceDescription,
        options: &GenerationOptions,
        year: i32,
    ) -> Self {
        let mut data = match description.to_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let flags: Map<String, Value> = description
            .features()
            .iter()
            .map(|f| (f.name.clone(), Value::Bool(f.enabled)))
            .collect();
        data.insert("featureFlags".into(), Value::Object(flags));

        let name = description.name();
        data.insert(
            "project".into(),
            json!({
                "name": name,
                "version": description.version(),
                "description": description.description().unwrap_or_default(),
                "year": year,
                "names": {
                    "camel": inflection::camel_case(name),
                    "pascal": inflection::pascal_case(name),
                    "kebab": inflection::kebab_case(name),
                    "snake": inflection::snake_case(name),
                    "constant": inflection::constant_case(name),
                }
            }),
        );

        data.insert(
            "options".into(),
            json!({
                "outputPath": options.output_path.display().to_string(),
                "force": options.force,
                "dryRun": options.dry_run,
                "verbose": options.verbose,
            }),
        );

        Self {
            data: Value::Object(data),
        }
    }

    /// Wrap an arbitrary value, e.g. for previewing a single template.
    pub fn from_value(data: Value) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

// ============================================================================
// Output
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }
}

impl Serialize for FileContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Binary(bytes) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("encoding", "base64")?;
                map.serialize_entry("data", &general_purpose::STANDARD.encode(bytes))?;
                map.end()
            }
        }
    }
}

/// One output file, path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFile {
    pub path: RelativePath,
    pub content: FileContent,
}

/// Merged dependency declarations, keyed by package name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DependencySet {
    pub production: BTreeMap<String, String>,
    pub development: BTreeMap<String, String>,
}

impl DependencySet {
    /// Insert into the dev or production set. A later insert for the same
    /// name replaces the earlier one, including its dev/production placement.
    pub fn insert(&mut self, name: impl Into<String>, version: impl Into<String>, dev: bool) {
        let name = name.into();
        let (set, other) = if dev {
            (&mut self.development, &mut self.production)
        } else {
            (&mut self.production, &mut self.development)
        };
        other.remove(&name);
        set.insert(name, version.into());
    }

    pub fn len(&self) -> usize {
        self.production.len() + self.development.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Name of the template that was used.
    pub template: String,
    /// Every output file, including the package manifest when generated.
    pub files: Vec<RenderedFile>,
    pub dependencies: DependencySet,
    /// Path of the generated package manifest, if any.
    pub manifest: Option<RelativePath>,
    pub dry_run: bool,
    /// Absolute paths written; empty in dry-run mode.
    pub written: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn file(&self, path: &str) -> Option<&RenderedFile> {
        self.files.iter().find(|f| f.path.as_str() == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::ConfigValidator;

    fn description() -> ServiceDescription {
        ConfigValidator::new()
            .validate(&json!({
                "name": "billing-api",
                "version": "0.1.0",
                "type": "API",
                "language": "go",
                "features": [{"name": "auth", "enabled": true}, {"name": "grpc", "enabled": false}]
            }))
            .unwrap()
    }

    #[test]
    fn context_exposes_description_and_derived_fields() {
        let options = GenerationOptions::new("/out").dry_run(true);
        let ctx = GenerationContext::with_year(&description(), &options, 2025);
        let data = ctx.data();
        assert_eq!(data["name"], "billing-api");
        assert_eq!(data["type"], "API");
        assert_eq!(data["featureFlags"]["auth"], true);
        assert_eq!(data["featureFlags"]["grpc"], false);
        assert_eq!(data["project"]["year"], 2025);
        assert_eq!(data["project"]["names"]["pascal"], "BillingApi");
        assert_eq!(data["project"]["names"]["constant"], "BILLING_API");
        assert_eq!(data["project"]["description"], "");
        assert_eq!(data["options"]["dryRun"], true);
        assert_eq!(data["options"]["outputPath"], "/out");
    }

    #[test]
    fn context_is_deterministic_for_fixed_year() {
        let options = GenerationOptions::new("out");
        let a = GenerationContext::with_year(&description(), &options, 2030);
        let b = GenerationContext::with_year(&description(), &options, 2030);
        assert_eq!(a, b);
    }

    #[test]
    fn dependency_set_last_insert_wins() {
        let mut deps = DependencySet::default();
        deps.insert("express", "^4.0.0", false);
        deps.insert("express", "^5.0.0", false);
        assert_eq!(deps.production["express"], "^5.0.0");
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn dependency_set_moves_name_between_sets() {
        let mut deps = DependencySet::default();
        deps.insert("typescript", "^4.0.0", false);
        deps.insert("typescript", "^5.0.0", true);
        assert!(!deps.production.contains_key("typescript"));
        assert_eq!(deps.development["typescript"], "^5.0.0");

        deps.insert("typescript", "^5.1.0", false);
        assert!(deps.development.is_empty());
        assert_eq!(deps.production["typescript"], "^5.1.0");
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn binary_payload_matches_reference_vectors() {
        let cases: [(&[u8], &str); 6] = [
            (b"", ""),
            (b"f", "Zg=="),
            (b"fo", "Zm8="),
            (b"foo", "Zm9v"),
            (b"foobar", "Zm9vYmFy"),
            (&[0xff, 0x00, 0x10], "/wAQ"),
        ];
        for (bytes, expected) in cases {
            let value = serde_json::to_value(FileContent::Binary(bytes.to_vec())).unwrap();
            assert_eq!(value["data"], expected, "{bytes:?}");
        }
    }

    #[test]
    fn binary_content_serialises_tagged() {
        let file = RenderedFile {
            path: RelativePath::try_new("logo.png").unwrap(),
            content: FileContent::Binary(b"foo".to_vec()),
        };
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["path"], "logo.png");
        assert_eq!(value["content"], json!({"encoding": "base64", "data": "Zm9v"}));
    }

    #[test]
    fn text_content_serialises_as_string() {
        let value = serde_json::to_value(FileContent::Text("hi".into())).unwrap();
        assert_eq!(value, json!("hi"));
    }
}
