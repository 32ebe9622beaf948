//! Validation backends and the process-wide backend registry.
//!
//! The set of backends is closed: each variant of [`Backend`] maps to a
//! [`Validate`] implementation. The registry is built once at first use and
//! is read-only afterwards, so it can be shared across threads without
//! locking.

mod flex;
mod openapi;
mod schema;
mod swagger;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::Serialize;

use crate::document::Document;
use crate::error::{codes, UnknownBackendError, ValidationError, ValidationIssue};
use crate::normalize::non_string_keys;
use crate::refs::{external_refs, unresolved_refs, RefProblem};
use crate::version::{DetectedVersion, SpecFamily};

/// Capability every backend provides: a pass/fail decision on a document.
///
/// Backends never mutate the document. Key normalization happens before
/// dispatch, in the parser core.
pub trait Validate: Send + Sync {
    fn validate(&self, document: &Document, ctx: &ValidationContext) -> Result<(), ValidationError>;
}

/// Inputs passed to a backend alongside the document.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    /// Strict mode rejects ambiguous documents, such as a numeric version
    /// marker.
    pub strict: bool,
    /// Version detected by the parser, if any.
    pub version: Option<DetectedVersion>,
}

/// A registered validation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Backend {
    #[serde(rename = "flex")]
    Flex,
    #[serde(rename = "swagger-spec-validator")]
    SwaggerSpecValidator,
    #[serde(rename = "openapi-spec-validator")]
    OpenApiSpecValidator,
}

impl Backend {
    /// All backends, in registry order.
    pub const ALL: [Backend; 3] = [
        Backend::Flex,
        Backend::SwaggerSpecValidator,
        Backend::OpenApiSpecValidator,
    ];

    /// The default backend, used when no name is given.
    pub const DEFAULT: Backend = Backend::OpenApiSpecValidator;

    pub fn name(self) -> &'static str {
        match self {
            Backend::Flex => "flex",
            Backend::SwaggerSpecValidator => "swagger-spec-validator",
            Backend::OpenApiSpecValidator => "openapi-spec-validator",
        }
    }

    fn index(self) -> usize {
        match self {
            Backend::Flex => 0,
            Backend::SwaggerSpecValidator => 1,
            Backend::OpenApiSpecValidator => 2,
        }
    }

    fn validator(self) -> &'static dyn Validate {
        match self {
            Backend::Flex => &flex::FlexValidator,
            Backend::SwaggerSpecValidator => &swagger::SwaggerValidator,
            Backend::OpenApiSpecValidator => &openapi::OpenApiValidator,
        }
    }

    fn describe(self) -> BackendDescriptor {
        match self {
            Backend::Flex => BackendDescriptor {
                backend: self,
                name: self.name(),
                description: "Swagger 2.0 structural checks; tolerates integer keys",
                strict_keys: false,
                versions: flex::SUPPORTED,
            },
            Backend::SwaggerSpecValidator => BackendDescriptor {
                backend: self,
                name: self.name(),
                description: "Swagger 2.0 JSON Schema validation",
                strict_keys: true,
                versions: swagger::SUPPORTED,
            },
            Backend::OpenApiSpecValidator => BackendDescriptor {
                backend: self,
                name: self.name(),
                description: "Swagger 2.0 and OpenAPI 3.0 JSON Schema validation",
                strict_keys: true,
                versions: openapi::SUPPORTED,
            },
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = UnknownBackendError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|b| b.name() == name)
            .ok_or_else(|| UnknownBackendError {
                name: name.to_string(),
                available: Backend::ALL.iter().map(|b| b.name()).collect(),
            })
    }
}

/// A `family major.minor` line a backend accepts (any patch level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionLine {
    pub family: SpecFamily,
    pub major: u64,
    pub minor: u64,
}

impl VersionLine {
    pub const fn new(family: SpecFamily, major: u64, minor: u64) -> Self {
        Self {
            family,
            major,
            minor,
        }
    }

    pub fn matches(&self, detected: &DetectedVersion) -> bool {
        self.family == detected.family
            && self.major == detected.version.major
            && self.minor == detected.version.minor
    }
}

impl fmt::Display for VersionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.family, self.major, self.minor)
    }
}

/// Registry entry describing a backend.
#[derive(Debug, Clone, Serialize)]
pub struct BackendDescriptor {
    pub backend: Backend,
    pub name: &'static str,
    pub description: &'static str,
    /// Whether the backend rejects non-string mapping keys.
    pub strict_keys: bool,
    /// Spec versions the backend accepts.
    pub versions: &'static [VersionLine],
}

impl BackendDescriptor {
    /// Run this backend against a document.
    pub fn validate(
        &self,
        document: &Document,
        ctx: &ValidationContext,
    ) -> Result<(), ValidationError> {
        tracing::debug!(backend = self.name, strict = ctx.strict, "invoking validation backend");
        self.backend.validator().validate(document, ctx)
    }

    pub fn supports(&self, detected: &DetectedVersion) -> bool {
        self.versions.iter().any(|line| line.matches(detected))
    }
}

/// Lookup table from backend name to descriptor.
#[derive(Debug)]
pub struct BackendRegistry {
    entries: Vec<BackendDescriptor>,
    default: Backend,
}

impl BackendRegistry {
    /// The process-wide registry.
    pub fn global() -> &'static BackendRegistry {
        static REGISTRY: OnceLock<BackendRegistry> = OnceLock::new();
        REGISTRY.get_or_init(BackendRegistry::builtin)
    }

    fn builtin() -> Self {
        Self {
            entries: Backend::ALL.into_iter().map(Backend::describe).collect(),
            default: Backend::DEFAULT,
        }
    }

    /// Resolve a backend by exact name. An empty name selects the default.
    pub fn resolve(&self, name: &str) -> Result<&BackendDescriptor, UnknownBackendError> {
        if name.is_empty() {
            return Ok(self.get(self.default));
        }
        name.parse::<Backend>().map(|backend| self.get(backend))
    }

    pub fn get(&self, backend: Backend) -> &BackendDescriptor {
        &self.entries[backend.index()]
    }

    pub fn default_backend(&self) -> &BackendDescriptor {
        self.get(self.default)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|d| d.name).collect()
    }
}

// ---------------------------------------------------------------------------
// Checks shared between backends
// ---------------------------------------------------------------------------

/// Reject documents whose version is unknown, ambiguous or unsupported.
///
/// Returns the detected version when the backend can proceed.
fn check_version(
    ctx: &ValidationContext,
    supported: &[VersionLine],
    issues: &mut Vec<ValidationIssue>,
) -> Option<DetectedVersion> {
    let Some(detected) = ctx.version else {
        issues.push(ValidationIssue::new(
            codes::UNSUPPORTED_VERSION,
            "could not determine spec version (no 'swagger' or 'openapi' marker)",
        ));
        return None;
    };

    if !supported.iter().any(|line| line.matches(&detected)) {
        let accepted: Vec<String> = supported.iter().map(|l| l.to_string()).collect();
        issues.push(
            ValidationIssue::new(
                codes::UNSUPPORTED_VERSION,
                format!(
                    "unsupported spec version: {} (supported: {})",
                    detected,
                    accepted.join(", ")
                ),
            )
            .at(format!("/{}", detected.family.marker())),
        );
        return None;
    }

    if ctx.strict && !detected.textual {
        issues.push(
            ValidationIssue::new(
                codes::UNSUPPORTED_VERSION,
                format!(
                    "'{}' must be a string in strict mode",
                    detected.family.marker()
                ),
            )
            .at(format!("/{}", detected.family.marker())),
        );
    }

    Some(detected)
}

/// Report every non-string mapping key.
fn check_string_keys(document: &Document, issues: &mut Vec<ValidationIssue>) {
    for key in non_string_keys(document) {
        issues.push(
            ValidationIssue::new(
                codes::NON_STRING_KEY,
                format!("mapping key {} must be a string", key.key),
            )
            .at(key.location),
        );
    }
}

/// Report broken local references.
fn check_refs(document: &Document, issues: &mut Vec<ValidationIssue>) {
    for issue in unresolved_refs(document) {
        let message = match issue.reason {
            RefProblem::Unresolved => format!("unresolved $ref: {}", issue.reference),
            RefProblem::NotAString => format!("$ref must be a string, got {}", issue.reference),
        };
        issues.push(ValidationIssue::new(codes::UNRESOLVED_REF, message).at(issue.location));
    }
    for (location, reference) in external_refs(document) {
        tracing::warn!(%location, %reference, "external $ref not checked");
    }
}

fn finish(backend: Backend, issues: Vec<ValidationIssue>) -> Result<(), ValidationError> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(backend.name(), issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::SpecVersion;

    #[test]
    fn registry_resolves_every_backend_by_name() {
        let registry = BackendRegistry::global();
        for backend in Backend::ALL {
            let descriptor = registry.resolve(backend.name()).unwrap();
            assert_eq!(descriptor.backend, backend);
            assert_eq!(descriptor.name, backend.name());
        }
        assert_eq!(
            registry.names(),
            vec!["flex", "swagger-spec-validator", "openapi-spec-validator"]
        );
    }

    #[test]
    fn empty_name_selects_default() {
        let registry = BackendRegistry::global();
        assert_eq!(
            registry.resolve("").unwrap().backend,
            Backend::OpenApiSpecValidator
        );
        assert_eq!(registry.default_backend().backend, Backend::DEFAULT);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let registry = BackendRegistry::global();
        for name in ["does_not_exist", "Flex", " flex", "openapi"] {
            let err = registry.resolve(name).unwrap_err();
            assert_eq!(err.name, name);
            assert_eq!(err.available.len(), 3);
        }
    }

    #[test]
    fn only_flex_tolerates_integer_keys() {
        let registry = BackendRegistry::global();
        let lenient: Vec<_> = registry
            .iter()
            .filter(|d| !d.strict_keys)
            .map(|d| d.backend)
            .collect();
        assert_eq!(lenient, vec![Backend::Flex]);
    }

    #[test]
    fn version_support() {
        let swagger = DetectedVersion {
            family: SpecFamily::Swagger,
            version: SpecVersion::new(2, 0, 0),
            textual: true,
        };
        let openapi = DetectedVersion {
            family: SpecFamily::OpenApi,
            version: SpecVersion::new(3, 0, 3),
            textual: true,
        };
        let registry = BackendRegistry::global();
        assert!(registry.get(Backend::Flex).supports(&swagger));
        assert!(!registry.get(Backend::Flex).supports(&openapi));
        assert!(!registry.get(Backend::SwaggerSpecValidator).supports(&openapi));
        assert!(registry.get(Backend::OpenApiSpecValidator).supports(&swagger));
        assert!(registry.get(Backend::OpenApiSpecValidator).supports(&openapi));
    }

    #[test]
    fn check_version_rejects_numeric_marker_only_in_strict_mode() {
        let detected = DetectedVersion {
            family: SpecFamily::Swagger,
            version: SpecVersion::new(2, 0, 0),
            textual: false,
        };
        let supported = [VersionLine::new(SpecFamily::Swagger, 2, 0)];

        let mut issues = Vec::new();
        let ctx = ValidationContext {
            strict: true,
            version: Some(detected),
        };
        assert!(check_version(&ctx, &supported, &mut issues).is_some());
        assert_eq!(issues.len(), 1);

        let mut issues = Vec::new();
        let ctx = ValidationContext {
            strict: false,
            version: Some(detected),
        };
        assert!(check_version(&ctx, &supported, &mut issues).is_some());
        assert!(issues.is_empty());
    }

    #[test]
    fn check_version_requires_a_marker() {
        let mut issues = Vec::new();
        let ctx = ValidationContext {
            strict: false,
            version: None,
        };
        assert!(check_version(&ctx, &[], &mut issues).is_none());
        assert_eq!(issues[0].code, codes::UNSUPPORTED_VERSION);
    }
}
