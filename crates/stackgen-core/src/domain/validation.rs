//! Schema validation for raw service descriptions.
//!
//! The validator walks the raw JSON value once, collecting every violated
//! constraint into a [`FieldError`] list. It never coerces an invalid value to
//! a default: only the optional top-level blocks `features` and `metadata`
//! receive defaults when absent. A `null` optional field is treated as absent.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::capabilities::validate_framework_compatibility;
use super::error::{FieldError, ValidationError};
use super::service::{
    ApiConfig, ApiStyle, CiProvider, CloudProvider, DatabaseConfig, DatabaseKind, Feature,
    InfrastructureConfig, PartialServiceDescription, ServiceDescription,
};
use super::value_objects::{Framework, Language, ServiceType};

pub const MAX_NAME_LEN: usize = 64;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("static regex"));

// Semantic Versioning 2.0.0, with ASCII digit classes.
static SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)",
        r"(?:-((?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)",
        r"(?:\.(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
        r"(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    ))
    .expect("static regex")
});

const TOP_LEVEL_KEYS: &[&str] = &[
    "name",
    "version",
    "type",
    "language",
    "framework",
    "description",
    "database",
    "api",
    "infrastructure",
    "features",
    "metadata",
];

const FEATURE_KEYS: &[&str] = &["name", "enabled", "config"];

/// Validates raw service descriptions.
///
/// Stateless; a single instance may be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a complete description.
    ///
    /// Fails with every violated constraint when any check fails.
    pub fn validate(&self, raw: &Value) -> Result<ServiceDescription, ValidationError> {
        let mut check = Checker::default();
        let Some(obj) = check.root(raw) else {
            return Err(check.finish_err());
        };

        let name = check.required(obj, "name").and_then(|v| check.name(v));
        let version = check.required(obj, "version").and_then(|v| check.version(v));
        let service_type = check
            .required(obj, "type")
            .and_then(|v| check.parse::<ServiceType>("type", v));
        let language = check
            .required(obj, "language")
            .and_then(|v| check.parse::<Language>("language", v));
        let framework = check
            .optional(obj, "framework")
            .and_then(|v| check.parse::<Framework>("framework", v));
        if let (Some(language), Some(framework)) = (language, framework) {
            check.compatibility(language, framework);
        }

        let description = check
            .optional(obj, "description")
            .and_then(|v| check.string("description", v));
        let database = check.optional(obj, "database").and_then(|v| check.database(v));
        let api = check.optional(obj, "api").and_then(|v| check.api(v));
        let infrastructure = check
            .optional(obj, "infrastructure")
            .and_then(|v| check.infrastructure(v));
        let features = match check.optional(obj, "features") {
            Some(v) => check.features(v),
            None => Some(Vec::new()),
        };
        let metadata = match check.optional(obj, "metadata") {
            Some(v) => check.object("metadata", v).cloned(),
            None => Some(Map::new()),
        };

        if !check.errors.is_empty() {
            return Err(check.finish_err());
        }

        // Every required value is `Some` once no errors were recorded.
        match (name, version, service_type, language, features, metadata) {
            (
                Some(name),
                Some(version),
                Some(service_type),
                Some(language),
                Some(features),
                Some(metadata),
            ) => Ok(ServiceDescription {
                name,
                version,
                service_type,
                language,
                framework,
                description,
                database,
                api,
                infrastructure,
                features,
                metadata,
            }),
            _ => Err(ValidationError::single("", "incomplete service description")),
        }
    }

    /// Validate any subset of fields.
    ///
    /// Required-ness is not enforced; present fields must satisfy their own
    /// rules, and the framework/language cross-check runs only when both are
    /// present and individually valid.
    pub fn validate_partial(
        &self,
        raw: &Value,
    ) -> Result<PartialServiceDescription, ValidationError> {
        let mut check = Checker::default();
        let Some(obj) = check.root(raw) else {
            return Err(check.finish_err());
        };

        if let Some(v) = check.optional(obj, "name") {
            check.name(v);
        }
        if let Some(v) = check.optional(obj, "version") {
            check.version(v);
        }
        if let Some(v) = check.optional(obj, "type") {
            check.parse::<ServiceType>("type", v);
        }
        let language = check
            .optional(obj, "language")
            .and_then(|v| check.parse::<Language>("language", v));
        let framework = check
            .optional(obj, "framework")
            .and_then(|v| check.parse::<Framework>("framework", v));
        if let (Some(language), Some(framework)) = (language, framework) {
            check.compatibility(language, framework);
        }
        if let Some(v) = check.optional(obj, "description") {
            check.string("description", v);
        }
        if let Some(v) = check.optional(obj, "database") {
            check.database(v);
        }
        if let Some(v) = check.optional(obj, "api") {
            check.api(v);
        }
        if let Some(v) = check.optional(obj, "infrastructure") {
            check.infrastructure(v);
        }
        if let Some(v) = check.optional(obj, "features") {
            check.features(v);
        }
        if let Some(v) = check.optional(obj, "metadata") {
            check.object("metadata", v);
        }

        if !check.errors.is_empty() {
            return Err(check.finish_err());
        }

        Ok(PartialServiceDescription {
            fields: obj
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
    }

    pub fn is_valid(&self, raw: &Value) -> bool {
        self.validate(raw).is_ok()
    }

    /// Every violation in `raw`; empty when it is valid.
    pub fn get_errors(&self, raw: &Value) -> Vec<FieldError> {
        self.validate(raw).err().map(|e| e.errors).unwrap_or_default()
    }
}

// ============================================================================
// Checker: accumulates errors while extracting typed values
// ============================================================================

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn finish_err(self) -> ValidationError {
        ValidationError::new(self.errors)
    }

    fn root<'a>(&mut self, raw: &'a Value) -> Option<&'a Map<String, Value>> {
        let Some(obj) = raw.as_object() else {
            self.push("", format!("expected an object, found {}", type_name(raw)));
            return None;
        };
        for key in obj.keys() {
            if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
                self.push(key.clone(), "unknown field");
            }
        }
        Some(obj)
    }

    fn required<'a>(&mut self, obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.push(key, "is required");
                None
            }
            Some(v) => Some(v),
        }
    }

    fn optional<'a>(&mut self, obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
        obj.get(key).filter(|v| !v.is_null())
    }

    // ── Scalars ──────────────────────────────────────────────────────────────

    fn string(&mut self, field: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.push(field, format!("expected a string, found {}", type_name(other)));
                None
            }
        }
    }

    fn boolean(&mut self, field: &str, value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            other => {
                self.push(field, format!("expected a boolean, found {}", type_name(other)));
                None
            }
        }
    }

    fn object<'a>(&mut self, field: &str, value: &'a Value) -> Option<&'a Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.push(field, format!("expected an object, found {}", type_name(other)));
                None
            }
        }
    }

    fn name(&mut self, value: &Value) -> Option<String> {
        let name = self.string("name", value)?;
        if name.chars().count() > MAX_NAME_LEN {
            self.push("name", format!("must be at most {MAX_NAME_LEN} characters"));
            return None;
        }
        if !NAME_RE.is_match(&name) {
            self.push(
                "name",
                "must start with a letter and contain only letters, digits, '-' or '_'",
            );
            return None;
        }
        Some(name)
    }

    fn version(&mut self, value: &Value) -> Option<String> {
        let version = self.string("version", value)?;
        if !SEMVER_RE.is_match(&version) {
            self.push(
                "version",
                format!("'{version}' is not a semantic version (e.g. 1.2.3)"),
            );
            return None;
        }
        Some(version)
    }

    fn parse<T>(&mut self, field: &str, value: &Value) -> Option<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.string(field, value)?;
        match raw.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.push(field, e.to_string());
                None
            }
        }
    }

    /// Accept one of `names` (case-insensitive) and deserialise it into `T`.
    fn one_of<T: DeserializeOwned>(
        &mut self,
        field: &str,
        value: &Value,
        names: &[&str],
    ) -> Option<T> {
        let raw = self.string(field, value)?;
        let lower = raw.to_ascii_lowercase();
        if !names.contains(&lower.as_str()) {
            self.push(
                field,
                format!("'{raw}' is not one of: {}", names.join(", ")),
            );
            return None;
        }
        serde_json::from_value(Value::String(lower)).ok()
    }

    fn compatibility(&mut self, language: Language, framework: Framework) {
        if let Err(message) = validate_framework_compatibility(framework, language) {
            self.push("framework", message);
        }
    }

    // ── Nested blocks ────────────────────────────────────────────────────────

    fn database(&mut self, value: &Value) -> Option<DatabaseConfig> {
        let obj = self.object("database", value)?;
        let before = self.errors.len();

        let kind = match obj.get("type").filter(|v| !v.is_null()) {
            Some(v) => self.one_of::<DatabaseKind>("database.type", v, DatabaseKind::NAMES),
            None => {
                self.push("database.type", "is required");
                None
            }
        };
        let name = obj
            .get("name")
            .filter(|v| !v.is_null())
            .and_then(|v| self.string("database.name", v));
        let port = match obj.get("port").filter(|v| !v.is_null()) {
            Some(v) => self.port(v),
            None => None,
        };

        let extra = extra_keys(obj, &["type", "name", "port"]);
        if self.errors.len() > before {
            return None;
        }
        Some(DatabaseConfig {
            kind: kind?,
            name,
            port,
            extra,
        })
    }

    fn port(&mut self, value: &Value) -> Option<u16> {
        match value.as_u64() {
            Some(p) if (1..=u64::from(u16::MAX)).contains(&p) => u16::try_from(p).ok(),
            _ => {
                self.push("database.port", "must be an integer between 1 and 65535");
                None
            }
        }
    }

    fn api(&mut self, value: &Value) -> Option<ApiConfig> {
        let obj = self.object("api", value)?;
        let before = self.errors.len();

        let style = obj
            .get("style")
            .filter(|v| !v.is_null())
            .and_then(|v| self.one_of::<ApiStyle>("api.style", v, ApiStyle::NAMES));
        let base_path = obj
            .get("basePath")
            .filter(|v| !v.is_null())
            .and_then(|v| self.string("api.basePath", v));
        if let Some(path) = &base_path {
            if !path.starts_with('/') {
                self.push("api.basePath", "must start with '/'");
            }
        }
        let version = obj
            .get("version")
            .filter(|v| !v.is_null())
            .and_then(|v| self.string("api.version", v));

        let extra = extra_keys(obj, &["style", "basePath", "version"]);
        (self.errors.len() == before).then_some(ApiConfig {
            style,
            base_path,
            version,
            extra,
        })
    }

    fn infrastructure(&mut self, value: &Value) -> Option<InfrastructureConfig> {
        let obj = self.object("infrastructure", value)?;
        let before = self.errors.len();

        let docker = obj
            .get("docker")
            .filter(|v| !v.is_null())
            .and_then(|v| self.boolean("infrastructure.docker", v));
        let kubernetes = obj
            .get("kubernetes")
            .filter(|v| !v.is_null())
            .and_then(|v| self.boolean("infrastructure.kubernetes", v));
        let ci = obj
            .get("ci")
            .filter(|v| !v.is_null())
            .and_then(|v| self.one_of::<CiProvider>("infrastructure.ci", v, CiProvider::NAMES));
        let cloud = obj.get("cloud").filter(|v| !v.is_null()).and_then(|v| {
            self.one_of::<CloudProvider>("infrastructure.cloud", v, CloudProvider::NAMES)
        });

        let extra = extra_keys(obj, &["docker", "kubernetes", "ci", "cloud"]);
        (self.errors.len() == before).then_some(InfrastructureConfig {
            docker,
            kubernetes,
            ci,
            cloud,
            extra,
        })
    }

    fn features(&mut self, value: &Value) -> Option<Vec<Feature>> {
        let Value::Array(items) = value else {
            self.push(
                "features",
                format!("expected an array, found {}", type_name(value)),
            );
            return None;
        };

        let before = self.errors.len();
        let mut seen = HashSet::new();
        let mut features = Vec::with_capacity(items.len());

        for (i, item) in items.iter().enumerate() {
            let base = format!("features[{i}]");
            let Some(obj) = self.object(&base, item) else {
                continue;
            };
            for key in obj.keys() {
                if !FEATURE_KEYS.contains(&key.as_str()) {
                    self.push(format!("{base}.{key}"), "unknown field");
                }
            }

            let name = match obj.get("name").filter(|v| !v.is_null()) {
                Some(v) => self.string(&format!("{base}.name"), v),
                None => {
                    self.push(format!("{base}.name"), "is required");
                    None
                }
            };
            let name = name.and_then(|n| {
                if n.trim().is_empty() {
                    self.push(format!("{base}.name"), "must not be empty");
                    None
                } else if !seen.insert(n.clone()) {
                    self.push(format!("{base}.name"), format!("duplicate feature '{n}'"));
                    None
                } else {
                    Some(n)
                }
            });

            let enabled = match obj.get("enabled").filter(|v| !v.is_null()) {
                Some(v) => self.boolean(&format!("{base}.enabled"), v),
                None => {
                    self.push(format!("{base}.enabled"), "is required");
                    None
                }
            };

            let config = match obj.get("config").filter(|v| !v.is_null()) {
                Some(v) => match self.object(&format!("{base}.config"), v) {
                    Some(map) => Some(Some(map.clone())),
                    None => None,
                },
                None => Some(None),
            };

            if let (Some(name), Some(enabled), Some(config)) = (name, enabled, config) {
                features.push(Feature {
                    name,
                    enabled,
                    config,
                });
            }
        }

        (self.errors.len() == before).then_some(features)
    }
}

fn extra_keys(obj: &Map<String, Value>, typed: &[&str]) -> Map<String, Value> {
    obj.iter()
        .filter(|(k, _)| !typed.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
