//! Spec version detection from the root `swagger` / `openapi` markers.

use std::fmt;

use serde::Serialize;
use serde_yaml::Value;

use crate::document::Document;

/// Which spec family a document declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecFamily {
    /// Swagger 2.0 (`swagger:` marker).
    Swagger,
    /// OpenAPI 3.x (`openapi:` marker).
    OpenApi,
}

impl SpecFamily {
    /// The root key that carries this family's version.
    pub fn marker(self) -> &'static str {
        match self {
            SpecFamily::Swagger => "swagger",
            SpecFamily::OpenApi => "openapi",
        }
    }
}

impl fmt::Display for SpecFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecFamily::Swagger => f.write_str("Swagger"),
            SpecFamily::OpenApi => f.write_str("OpenAPI"),
        }
    }
}

/// A `(major, minor, patch)` spec version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SpecVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SpecVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn as_tuple(self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    /// Parse a version marker, padding short forms (`"2.0"` -> `2.0.0`).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let parsed = semver::Version::parse(text)
            .or_else(|_| semver::Version::parse(&format!("{}.0", text)))
            .or_else(|_| semver::Version::parse(&format!("{}.0.0", text)))
            .ok()?;
        Some(Self::new(parsed.major, parsed.minor, parsed.patch))
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The result of inspecting a document's version marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectedVersion {
    pub family: SpecFamily,
    pub version: SpecVersion,
    /// Whether the marker was authored as a string (`"2.0"`) rather than a
    /// number (`2.0`).
    pub textual: bool,
}

impl fmt::Display for DetectedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.version)
    }
}

/// Detect the spec family and version from root markers.
///
/// `openapi` takes precedence over `swagger`. Returns `None` when neither
/// marker is present or parseable.
pub fn detect_version(document: &Document) -> Option<DetectedVersion> {
    [SpecFamily::OpenApi, SpecFamily::Swagger]
        .into_iter()
        .find_map(|family| {
            let marker = document.get(family.marker())?;
            let (text, textual) = match marker {
                Value::String(s) => (s.clone(), true),
                Value::Number(n) => (n.to_string(), false),
                _ => return None,
            };
            let version = SpecVersion::parse(&text)?;
            Some(DetectedVersion {
                family,
                version,
                textual,
            })
        })
}
