use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors produced while constructing or validating a [`SpecParser`](crate::SpecParser).
///
/// The three variants are distinct on purpose: callers branch on
/// "bad configuration" vs "unreadable document" vs "document rejected".
#[derive(Debug, Error)]
pub enum ParseError {
    /// E1005: The requested backend is not registered.
    #[error(transparent)]
    UnknownBackend(#[from] UnknownBackendError),

    /// E1000/E1002: The source could not be read or is not a document.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The selected backend rejected the document.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Coarse classification of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Configuration misuse, raised before any document work.
    Config,
    /// The source could not be loaded.
    Load,
    /// The backend rejected the document.
    Validation,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnknownBackend(_) => ErrorKind::Config,
            ParseError::Load(_) => ErrorKind::Load,
            ParseError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// The backend diagnostics, if this is a validation failure.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            ParseError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// E1005: Unknown validation backend name.
#[derive(Debug, Clone, Error)]
#[error("E1005: unknown validation backend '{name}' (available: {})", .available.join(", "))]
pub struct UnknownBackendError {
    /// The name that was requested.
    pub name: String,
    /// Registered backend identifiers.
    pub available: Vec<&'static str>,
}

/// Errors reading a source into a [`Document`](crate::Document).
#[derive(Debug, Error)]
pub enum LoadError {
    /// E1000: The file could not be read.
    #[error("E1000: cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// E1002: YAML/JSON syntax error.
    #[error("E1002: parse error: {0}")]
    Syntax(String),

    /// E1002: The document root is not a mapping.
    #[error("E1002: spec root must be a mapping")]
    NotAMapping,
}

/// Stable diagnostic codes reported by validation backends.
pub mod codes {
    /// Unsupported or undetermined spec version.
    pub const UNSUPPORTED_VERSION: &str = "E1001";
    /// Unresolved `$ref`.
    pub const UNRESOLVED_REF: &str = "E1003";
    /// Schema violation.
    pub const SCHEMA: &str = "E1004";
    /// Non-string mapping key under strict key typing.
    pub const NON_STRING_KEY: &str = "E1006";
}

/// A single backend diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code: &'static str,
    pub message: String,
    /// JSON-pointer-like location inside the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ValidationIssue {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} [{}]: {}", self.code, loc, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// The chosen backend rejected the document.
///
/// Always carries at least one issue.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// Identifier of the backend that produced the diagnostics.
    pub backend: &'static str,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(backend: &'static str, issues: Vec<ValidationIssue>) -> Self {
        Self { backend, issues }
    }

    /// Returns true if any issue carries the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.split_first() {
            None => write!(f, "{}: validation failed", self.backend),
            Some((first, [])) => write!(f, "{}: {}", self.backend, first),
            Some((first, rest)) => write!(
                f,
                "{}: {} (and {} more issue(s))",
                self.backend,
                first,
                rest.len()
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
