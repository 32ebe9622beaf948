use std::path::{Path, PathBuf};

use crate::backend::{BackendDescriptor, BackendRegistry, ValidationContext};
use crate::document::Document;
use crate::error::{ParseError, ValidationError};
use crate::normalize::{stringify_keys, KeyIssue};
use crate::version::{detect_version, DetectedVersion, SpecFamily, SpecVersion};

/// Construction options for [`SpecParser`].
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Backend name. Empty selects the registry default.
    pub backend: String,
    /// Keep keys as authored (true) or stringify integer keys first (false).
    pub strict: bool,
    /// Defer validation until [`SpecParser::parse`] is called.
    pub lazy: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            backend: String::new(),
            strict: true,
            lazy: false,
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }
}

/// Where a parser is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Document loaded, backend not yet run.
    Loaded,
    /// The backend accepted the document on the last run.
    Validated,
    /// The backend rejected the document on the last run.
    Failed,
}

/// Lifecycle phase plus the detected version.
///
/// The version is tracked separately from the phase: it is recorded before
/// the backend runs, so a rejected document still reports its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserState {
    phase: Phase,
    version: Option<DetectedVersion>,
}

impl ParserState {
    fn loaded() -> Self {
        Self {
            phase: Phase::Loaded,
            version: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn detected(&self) -> Option<DetectedVersion> {
        self.version
    }

    /// `None` until validation has run.
    pub fn valid(&self) -> Option<bool> {
        match self.phase {
            Phase::Loaded => None,
            Phase::Validated => Some(true),
            Phase::Failed => Some(false),
        }
    }
}

/// Loads a specification and validates it through a selected backend.
///
/// Eager parsers (the default) are validated before construction returns.
/// Lazy parsers stay [`Phase::Loaded`] until [`parse`](Self::parse) is called.
#[derive(Debug)]
pub struct SpecParser {
    source: Option<PathBuf>,
    specification: Document,
    backend: &'static BackendDescriptor,
    options: ParserOptions,
    state: ParserState,
    shadowed_keys: Vec<KeyIssue>,
}

impl SpecParser {
    /// Load and (unless lazy) validate the spec at `path`.
    pub fn new(path: impl AsRef<Path>, options: ParserOptions) -> Result<Self, ParseError> {
        let backend = BackendRegistry::global().resolve(&options.backend)?;
        let path = path.as_ref();
        let document = Document::from_path(path)?;
        tracing::debug!(source = %path.display(), backend = backend.name, "spec loaded");
        Self::build(Some(path.to_path_buf()), document, backend, options)
    }

    /// Parse and (unless lazy) validate a YAML/JSON string.
    pub fn from_text(input: &str, options: ParserOptions) -> Result<Self, ParseError> {
        let backend = BackendRegistry::global().resolve(&options.backend)?;
        let document = Document::from_text(input)?;
        Self::build(None, document, backend, options)
    }

    /// Wrap an already-loaded document.
    pub fn from_document(document: Document, options: ParserOptions) -> Result<Self, ParseError> {
        let backend = BackendRegistry::global().resolve(&options.backend)?;
        Self::build(None, document, backend, options)
    }

    fn build(
        source: Option<PathBuf>,
        mut specification: Document,
        backend: &'static BackendDescriptor,
        options: ParserOptions,
    ) -> Result<Self, ParseError> {
        let mut shadowed_keys = Vec::new();
        if !options.strict {
            let report = stringify_keys(&mut specification);
            if report.rewritten > 0 {
                tracing::info!(count = report.rewritten, "stringified integer keys (lenient mode)");
            }
            shadowed_keys = report.shadowed;
        }

        let mut parser = Self {
            source,
            specification,
            backend,
            options,
            state: ParserState::loaded(),
            shadowed_keys,
        };

        if !parser.options.lazy {
            parser.parse()?;
        }
        Ok(parser)
    }

    /// Run the backend now.
    ///
    /// The version is detected and recorded first, so it is available even
    /// when validation fails. Every call re-runs the backend.
    pub fn parse(&mut self) -> Result<(), ValidationError> {
        self.state.version = detect_version(&self.specification);

        let ctx = ValidationContext {
            strict: self.options.strict,
            version: self.state.version,
        };
        match self.backend.validate(&self.specification, &ctx) {
            Ok(()) => {
                self.state.phase = Phase::Validated;
                tracing::info!(backend = self.backend.name, "spec is valid");
                Ok(())
            }
            Err(e) => {
                self.state.phase = Phase::Failed;
                tracing::warn!(
                    backend = self.backend.name,
                    issues = e.issues.len(),
                    "spec failed validation"
                );
                Err(e)
            }
        }
    }

    /// The loaded document, with keys normalized in lenient mode.
    pub fn specification(&self) -> &Document {
        &self.specification
    }

    pub fn into_specification(self) -> Document {
        self.specification
    }

    pub fn valid(&self) -> Option<bool> {
        self.state.valid()
    }

    /// The detected spec version, once [`parse`](Self::parse) has run.
    pub fn version_parsed(&self) -> Option<SpecVersion> {
        self.state.version.map(|d| d.version)
    }

    pub fn family(&self) -> Option<SpecFamily> {
        self.state.version.map(|d| d.family)
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn backend(&self) -> &'static BackendDescriptor {
        self.backend
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Integer keys dropped during lenient normalization because the same
    /// key was also authored as a string.
    pub fn shadowed_keys(&self) -> &[KeyIssue] {
        &self.shadowed_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const VALID: &str = r#"
swagger: "2.0"
info:
  title: Test
  version: "1.0"
paths:
  /test:
    get:
      responses:
        "200":
          description: OK
"#;

    const BROKEN_V3: &str = r#"
openapi: "3.0.0"
info:
  title: Broken
  version: "1.0"
paths:
  /test:
    post:
      responses:
        200:
          content: {}
"#;

    #[test]
    fn eager_parser_is_validated() {
        let parser = SpecParser::from_text(VALID, ParserOptions::default()).unwrap();
        assert_eq!(parser.state().phase(), Phase::Validated);
        assert_eq!(parser.valid(), Some(true));
        assert_eq!(parser.version_parsed(), Some(SpecVersion::new(2, 0, 0)));
        assert_eq!(parser.family(), Some(SpecFamily::Swagger));
        assert_eq!(parser.backend().name, "openapi-spec-validator");
        assert!(parser.source().is_none());
    }

    #[test]
    fn unknown_backend_fails_before_loading() {
        // The document is not even YAML: the backend is resolved first.
        let err = SpecParser::from_text(
            "[[[",
            ParserOptions::new().with_backend("does_not_exist"),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn lazy_parser_defers_validation() {
        let options = ParserOptions::new().with_strict(false).with_lazy(true);
        let mut parser = SpecParser::from_text(BROKEN_V3, options).unwrap();
        assert_eq!(parser.state().phase(), Phase::Loaded);
        assert_eq!(parser.valid(), None);
        assert_eq!(parser.version_parsed(), None);

        let err = parser.parse().unwrap_err();
        assert_eq!(err.backend, "openapi-spec-validator");
        assert_eq!(parser.valid(), Some(false));
        assert_eq!(parser.state().phase(), Phase::Failed);
        assert_eq!(parser.version_parsed().map(SpecVersion::as_tuple), Some((3, 0, 0)));
    }

    #[test]
    fn parse_reruns_each_time() {
        let mut parser =
            SpecParser::from_text(VALID, ParserOptions::new().with_lazy(true)).unwrap();
        parser.parse().unwrap();
        parser.parse().unwrap();
        assert_eq!(parser.valid(), Some(true));

        let mut broken =
            SpecParser::from_text(BROKEN_V3, ParserOptions::new().with_lazy(true)).unwrap();
        assert!(broken.parse().is_err());
        assert!(broken.parse().is_err());
        assert_eq!(broken.valid(), Some(false));
    }

    #[test]
    fn lenient_mode_normalizes_before_dispatch() {
        let parser = SpecParser::from_text(
            &VALID.replace("\"200\"", "200"),
            ParserOptions::new().with_strict(false),
        )
        .unwrap();
        let responses = parser
            .specification()
            .pointer("/paths/~1test/get/responses")
            .and_then(|v| v.as_mapping())
            .unwrap();
        assert!(responses.contains_key("200"));
    }

    #[test]
    fn strict_mode_leaves_keys_alone_when_lazy() {
        let parser = SpecParser::from_text(
            &VALID.replace("\"200\"", "200"),
            ParserOptions::new().with_lazy(true),
        )
        .unwrap();
        let responses = parser
            .specification()
            .pointer("/paths/~1test/get/responses")
            .and_then(|v| v.as_mapping())
            .unwrap();
        assert!(responses.contains_key(&serde_yaml::Value::Number(200.into())));
    }

    #[test]
    fn lenient_mode_reports_shadowed_keys() {
        let source = VALID.replace(
            "        \"200\":\n",
            "        200:\n          description: integer\n        \"200\":\n",
        );
        let parser =
            SpecParser::from_text(&source, ParserOptions::new().with_strict(false)).unwrap();
        assert_eq!(parser.valid(), Some(true));
        assert_eq!(
            parser.shadowed_keys(),
            &[KeyIssue {
                location: "/paths/~1test/get/responses".into(),
                key: "200".into(),
            }]
        );

        let strict = SpecParser::from_text(VALID, ParserOptions::default()).unwrap();
        assert!(strict.shadowed_keys().is_empty());
    }
}
