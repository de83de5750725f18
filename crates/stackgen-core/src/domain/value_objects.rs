//! Domain value objects: ServiceType, Language, Framework, EngineKind.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! They hold NO capability logic. Which frameworks belong to which language
//! lives in `capabilities.rs`. This file defines the types, their canonical
//! string forms, and their `FromStr` parsers.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` arm and the `FromStr` arm here
//! 3. For frameworks, list it under its language(s) in `capabilities.rs`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A string did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl ParseVariantError {
    fn new(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

// ── ServiceType ──────────────────────────────────────────────────────────────

/// The kind of service being scaffolded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "API")]
    Api,
    WebApp,
    Microservice,
    Library,
    #[serde(rename = "CLI")]
    Cli,
    Worker,
    Function,
}

impl ServiceType {
    pub const ALL: [ServiceType; 7] = [
        Self::Api,
        Self::WebApp,
        Self::Microservice,
        Self::Library,
        Self::Cli,
        Self::Worker,
        Self::Function,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "API",
            Self::WebApp => "WebApp",
            Self::Microservice => "Microservice",
            Self::Library => "Library",
            Self::Cli => "CLI",
            Self::Worker => "Worker",
            Self::Function => "Function",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "webapp" | "web-app" => Ok(Self::WebApp),
            "microservice" => Ok(Self::Microservice),
            "library" => Ok(Self::Library),
            "cli" => Ok(Self::Cli),
            "worker" => Ok(Self::Worker),
            "function" => Ok(Self::Function),
            _ => Err(ParseVariantError::new(
                "service type",
                s,
                &Self::ALL.map(|t| t.as_str()),
            )),
        }
    }
}

// ── Language ─────────────────────────────────────────────────────────────────

/// A supported target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Python,
    Java,
    Rust,
    TypeScript,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Self::Go,
        Self::Python,
        Self::Java,
        Self::Rust,
        Self::TypeScript,
        Self::JavaScript,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Python => "python",
            Self::Java => "java",
            Self::Rust => "rust",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
        }
    }

    /// Frameworks registered for this language.
    ///
    /// Delegates to `capabilities::frameworks_for`.
    pub fn frameworks(self) -> &'static [Framework] {
        crate::domain::capabilities::frameworks_for(self)
    }

    /// Whether `framework` belongs to this language's framework set.
    pub fn supports(self, framework: Framework) -> bool {
        self.frameworks().contains(&framework)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "go" | "golang" => Ok(Self::Go),
            "python" | "py" => Ok(Self::Python),
            "java" => Ok(Self::Java),
            "rust" | "rs" => Ok(Self::Rust),
            "typescript" | "ts" => Ok(Self::TypeScript),
            "javascript" | "js" => Ok(Self::JavaScript),
            _ => Err(ParseVariantError::new(
                "language",
                s,
                &Self::ALL.map(|l| l.as_str()),
            )),
        }
    }
}

// ── Framework ────────────────────────────────────────────────────────────────

/// A framework. Frameworks are not namespaced by language because some
/// (express, fastify, koa, nextjs) are shared between TypeScript and
/// JavaScript; language membership is a capability rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    // go
    Gin,
    Echo,
    Fiber,
    Chi,
    // python
    FastApi,
    Flask,
    Django,
    Celery,
    // java
    SpringBoot,
    Quarkus,
    Micronaut,
    // rust
    Actix,
    Axum,
    Tonic,
    Rocket,
    // typescript / javascript
    Express,
    NestJs,
    Fastify,
    Koa,
    NextJs,
}

impl Framework {
    pub const ALL: [Framework; 20] = [
        Self::Gin,
        Self::Echo,
        Self::Fiber,
        Self::Chi,
        Self::FastApi,
        Self::Flask,
        Self::Django,
        Self::Celery,
        Self::SpringBoot,
        Self::Quarkus,
        Self::Micronaut,
        Self::Actix,
        Self::Axum,
        Self::Tonic,
        Self::Rocket,
        Self::Express,
        Self::NestJs,
        Self::Fastify,
        Self::Koa,
        Self::NextJs,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gin => "gin",
            Self::Echo => "echo",
            Self::Fiber => "fiber",
            Self::Chi => "chi",
            Self::FastApi => "fastapi",
            Self::Flask => "flask",
            Self::Django => "django",
            Self::Celery => "celery",
            Self::SpringBoot => "springboot",
            Self::Quarkus => "quarkus",
            Self::Micronaut => "micronaut",
            Self::Actix => "actix",
            Self::Axum => "axum",
            Self::Tonic => "tonic",
            Self::Rocket => "rocket",
            Self::Express => "express",
            Self::NestJs => "nestjs",
            Self::Fastify => "fastify",
            Self::Koa => "koa",
            Self::NextJs => "nextjs",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let normalized = match lower.as_str() {
            "spring-boot" | "spring" => "springboot",
            "actix-web" => "actix",
            "nest" => "nestjs",
            "next" | "next.js" => "nextjs",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|fw| fw.as_str() == normalized)
            .ok_or_else(|| ParseVariantError::new("framework", s, &Self::ALL.map(|f| f.as_str())))
    }
}

// ── EngineKind ───────────────────────────────────────────────────────────────

/// Which template syntax a render engine instance speaks.
///
/// Chosen once per engine instance, never per render call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Handlebars syntax (`{{camelCase name}}`).
    #[default]
    #[serde(alias = "handlebars", alias = "hbs")]
    Primary,
    /// Jinja syntax (`{{ name | camelCase }}`).
    #[serde(alias = "jinja", alias = "minijinja", alias = "j2")]
    Secondary,
}

impl EngineKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "handlebars",
            Self::Secondary => "jinja",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "handlebars" | "hbs" | "primary" => Ok(Self::Primary),
            "jinja" | "minijinja" | "j2" | "secondary" => Ok(Self::Secondary),
            _ => Err(ParseVariantError::new(
                "template engine",
                s,
                &["handlebars", "jinja"],
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_type_round_trips_canonical_names() {
        for t in ServiceType::ALL {
            assert_eq!(t.as_str().parse::<ServiceType>().unwrap(), t);
        }
    }

    #[test]
    fn service_type_parse_is_case_insensitive() {
        assert_eq!("api".parse::<ServiceType>().unwrap(), ServiceType::Api);
        assert_eq!("WEBAPP".parse::<ServiceType>().unwrap(), ServiceType::WebApp);
        assert_eq!("cli".parse::<ServiceType>().unwrap(), ServiceType::Cli);
    }

    #[test]
    fn service_type_serializes_canonically() {
        let json = serde_json::to_string(&ServiceType::Api).unwrap();
        assert_eq!(json, "\"API\"");
        let json = serde_json::to_string(&ServiceType::WebApp).unwrap();
        assert_eq!(json, "\"WebApp\"");
    }

    #[test]
    fn language_from_str_accepts_aliases() {
        assert_eq!("golang".parse::<Language>().unwrap(), Language::Go);
        assert_eq!("ts".parse::<Language>().unwrap(), Language::TypeScript);
        assert_eq!("JS".parse::<Language>().unwrap(), Language::JavaScript);
    }

    #[test]
    fn language_from_str_unknown_lists_expected() {
        let err = "cobol".parse::<Language>().unwrap_err();
        assert!(err.to_string().contains("cobol"));
        assert!(err.expected.contains("python"));
    }

    #[test]
    fn framework_from_str_normalizes_common_spellings() {
        assert_eq!("Spring-Boot".parse::<Framework>().unwrap(), Framework::SpringBoot);
        assert_eq!("actix-web".parse::<Framework>().unwrap(), Framework::Actix);
        assert_eq!("FastAPI".parse::<Framework>().unwrap(), Framework::FastApi);
        assert!("rails".parse::<Framework>().is_err());
    }

    #[test]
    fn engine_kind_parses_both_syntaxes() {
        assert_eq!("hbs".parse::<EngineKind>().unwrap(), EngineKind::Primary);
        assert_eq!("jinja".parse::<EngineKind>().unwrap(), EngineKind::Secondary);
        assert_eq!(EngineKind::default(), EngineKind::Primary);
    }
}
