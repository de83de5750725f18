//! The validated service description and its nested configuration blocks.
//!
//! Instances are only produced by [`ConfigValidator`](crate::domain::ConfigValidator);
//! there is no public constructor that bypasses validation. Serialising a
//! description and validating the result again yields an equal value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ValidationError;
use super::validation::ConfigValidator;
use super::value_objects::{Framework, Language, ServiceType};

/// A validated request describing what kind of service to scaffold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescription {
    pub(crate) name: String,
    pub(crate) version: String,
    #[serde(rename = "type")]
    pub(crate) service_type: ServiceType,
    pub(crate) language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) framework: Option<Framework>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) database: Option<DatabaseConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) api: Option<ApiConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) infrastructure: Option<InfrastructureConfig>,
    pub(crate) features: Vec<Feature>,
    pub(crate) metadata: Map<String, Value>,
}

impl ServiceDescription {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn framework(&self) -> Option<Framework> {
        self.framework
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn database(&self) -> Option<&DatabaseConfig> {
        self.database.as_ref()
    }

    pub fn api(&self) -> Option<&ApiConfig> {
        self.api.as_ref()
    }

    pub fn infrastructure(&self) -> Option<&InfrastructureConfig> {
        self.infrastructure.as_ref()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Whether a feature with this name exists and is enabled.
    pub fn has_feature(&self, name: &str) -> bool {
        self.features.iter().any(|f| f.name == name && f.enabled)
    }

    /// The description as a JSON object in canonical form.
    pub fn to_value(&self) -> Value {
        // A struct of strings, enums and JSON maps always serialises.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// One optional feature toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    Postgres,
    Mysql,
    Mongodb,
    Redis,
    Sqlite,
}

impl DatabaseKind {
    pub const NAMES: &'static [&'static str] = &["postgres", "mysql", "mongodb", "redis", "sqlite"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub kind: DatabaseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Keys beyond the typed ones, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStyle {
    Rest,
    Graphql,
    Grpc,
}

impl ApiStyle {
    pub const NAMES: &'static [&'static str] = &["rest", "graphql", "grpc"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ApiStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CiProvider {
    Github,
    Gitlab,
    #[serde(rename = "none")]
    Disabled,
}

impl CiProvider {
    pub const NAMES: &'static [&'static str] = &["github", "gitlab", "none"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Gcp,
    Azure,
}

impl CloudProvider {
    pub const NAMES: &'static [&'static str] = &["aws", "gcp", "azure"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci: Option<CiProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud: Option<CloudProvider>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Partial descriptions (patch workflows)
// ============================================================================

/// A subset of description fields whose present values have passed per-field
/// validation.
///
/// Stored as the raw JSON object so that merging over a base description is
/// a key-by-key overlay.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PartialServiceDescription {
    pub(crate) fields: Map<String, Value>,
}

impl PartialServiceDescription {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overlay this patch onto `base` and validate the merged result.
    ///
    /// Top-level keys in the patch replace the base's keys wholesale; nested
    /// blocks are not deep-merged.
    pub fn apply_to(&self, base: &ServiceDescription) -> Result<ServiceDescription, ValidationError> {
        let mut merged = match base.to_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in &self.fields {
            merged.insert(key.clone(), value.clone());
        }
        ConfigValidator::new().validate(&Value::Object(merged))
    }
}
