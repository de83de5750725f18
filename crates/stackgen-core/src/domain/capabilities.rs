//! Language capability registry.
//!
//! # Design
//!
//! Which frameworks belong to which language, and whether a language
//! participates in a package-manifest ecosystem, is described exactly once per
//! language by a [`LanguageDef`]. Validation, generation and discovery all
//! read from [`LANGUAGE_REGISTRY`]; no `match` on `Language` elsewhere decides
//! compatibility.
//!
//! # Adding a New Language
//!
//! 1. Add a variant to `Language` in `value_objects.rs`
//! 2. Add a [`LanguageDef`] entry to [`LANGUAGE_REGISTRY`]
//! 3. Nothing else: the validator and generator derive from the registry

use crate::domain::value_objects::{Framework, Language};

// ── Language definitions ─────────────────────────────────────────────────────

/// Everything the domain needs to know about one language.
#[derive(Debug, Clone, Copy)]
pub struct LanguageDef {
    pub language: Language,

    /// Frameworks a description may name together with this language.
    pub frameworks: &'static [Framework],

    /// File name of the package manifest the generator emits at the output
    /// root, if the language has one.
    pub package_manifest: Option<&'static str>,
}

/// Single source of truth for language capabilities.
pub static LANGUAGE_REGISTRY: &[LanguageDef] = &[
    LanguageDef {
        language: Language::Go,
        frameworks: &[Framework::Gin, Framework::Echo, Framework::Fiber, Framework::Chi],
        package_manifest: None,
    },
    LanguageDef {
        language: Language::Python,
        frameworks: &[
            Framework::FastApi,
            Framework::Flask,
            Framework::Django,
            Framework::Celery,
        ],
        package_manifest: None,
    },
    LanguageDef {
        language: Language::Java,
        frameworks: &[Framework::SpringBoot, Framework::Quarkus, Framework::Micronaut],
        package_manifest: None,
    },
    LanguageDef {
        language: Language::Rust,
        frameworks: &[
            Framework::Actix,
            Framework::Axum,
            Framework::Tonic,
            Framework::Rocket,
        ],
        package_manifest: None,
    },
    LanguageDef {
        language: Language::TypeScript,
        frameworks: &[
            Framework::Express,
            Framework::NestJs,
            Framework::Fastify,
            Framework::Koa,
            Framework::NextJs,
        ],
        package_manifest: Some("package.json"),
    },
    LanguageDef {
        language: Language::JavaScript,
        frameworks: &[
            Framework::Express,
            Framework::Fastify,
            Framework::Koa,
            Framework::NextJs,
        ],
        package_manifest: Some("package.json"),
    },
];

// ── Lookup ───────────────────────────────────────────────────────────────────

pub fn find_language(language: Language) -> Option<&'static LanguageDef> {
    LANGUAGE_REGISTRY.iter().find(|def| def.language == language)
}

/// Frameworks registered for `language`; empty if the language is unregistered.
pub fn frameworks_for(language: Language) -> &'static [Framework] {
    find_language(language).map(|def| def.frameworks).unwrap_or(&[])
}

/// Package manifest file name for `language`, if it has one.
pub fn package_manifest_for(language: Language) -> Option<&'static str> {
    find_language(language).and_then(|def| def.package_manifest)
}

/// Languages that list `framework` in their framework set.
pub fn languages_for(framework: Framework) -> Vec<Language> {
    LANGUAGE_REGISTRY
        .iter()
        .filter(|def| def.frameworks.contains(&framework))
        .map(|def| def.language)
        .collect()
}

/// Validate that `framework` may be used with `language`.
///
/// Returns a human-readable message naming the language and the frameworks
/// it accepts on mismatch.
pub fn validate_framework_compatibility(
    framework: Framework,
    language: Language,
) -> Result<(), String> {
    if language.supports(framework) {
        return Ok(());
    }

    let supported = frameworks_for(language)
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Err(format!(
        "framework '{framework}' is not available for language '{language}' (expected one of: {supported})"
    ))
}

// ── Registry integrity (checked in tests) ────────────────────────────────────

/// Assert that the registry is internally consistent.
///
/// Panics with a clear message on any violation.
#[doc(hidden)]
pub fn assert_registry_integrity() {
    for language in Language::ALL {
        let defs = LANGUAGE_REGISTRY
            .iter()
            .filter(|d| d.language == language)
            .count();
        assert_eq!(defs, 1, "{language:?} must be registered exactly once");
    }

    for framework in Framework::ALL {
        assert!(
            !languages_for(framework).is_empty(),
            "Framework {framework:?} is not listed under any language"
        );
    }

    for def in LANGUAGE_REGISTRY {
        let mut seen = def.frameworks.to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(
            seen.len(),
            def.frameworks.len(),
            "{:?} lists a framework twice",
            def.language
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_internally_consistent() {
        assert_registry_integrity();
    }

    #[test]
    fn go_accepts_gin_but_not_express() {
        assert!(Language::Go.supports(Framework::Gin));
        assert!(!Language::Go.supports(Framework::Express));
    }

    #[test]
    fn express_is_shared_by_typescript_and_javascript() {
        let langs = languages_for(Framework::Express);
        assert!(langs.contains(&Language::TypeScript));
        assert!(langs.contains(&Language::JavaScript));
        assert_eq!(langs.len(), 2);
    }

    #[test]
    fn nestjs_is_typescript_only() {
        assert_eq!(languages_for(Framework::NestJs), vec![Language::TypeScript]);
    }

    #[test]
    fn only_js_ecosystem_has_package_manifest() {
        assert_eq!(package_manifest_for(Language::TypeScript), Some("package.json"));
        assert_eq!(package_manifest_for(Language::JavaScript), Some("package.json"));
        assert_eq!(package_manifest_for(Language::Go), None);
        assert_eq!(package_manifest_for(Language::Rust), None);
    }

    #[test]
    fn mismatch_message_names_language_and_alternatives() {
        let err = validate_framework_compatibility(Framework::Django, Language::Go).unwrap_err();
        assert!(err.contains("django"));
        assert!(err.contains("'go'"));
        assert!(err.contains("gin"));
    }

    #[test]
    fn compatible_pair_is_ok() {
        assert!(validate_framework_compatibility(Framework::Axum, Language::Rust).is_ok());
    }
}
