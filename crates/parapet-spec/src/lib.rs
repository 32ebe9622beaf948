//! Swagger 2.0 and OpenAPI 3.0 spec parser with pluggable validation backends.
//!
//! Loads YAML/JSON specs, detects the version from the root `swagger` or
//! `openapi` marker, and validates through one of the registered backends,
//! either eagerly at construction or lazily on [`SpecParser::parse`].
//!
//! ```no_run
//! use parapet_spec::{ParserOptions, SpecParser};
//!
//! let parser = SpecParser::new(
//!     "petstore.yaml",
//!     ParserOptions::new().with_backend("flex"),
//! )?;
//! assert_eq!(parser.valid(), Some(true));
//! # Ok::<(), parapet_spec::ParseError>(())
//! ```

pub mod backend;
pub mod document;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod refs;
pub mod version;

pub use backend::{
    Backend, BackendDescriptor, BackendRegistry, Validate, ValidationContext, VersionLine,
};
pub use document::Document;
pub use error::{
    codes, ErrorKind, LoadError, ParseError, UnknownBackendError, ValidationError,
    ValidationIssue,
};
pub use normalize::{KeyIssue, Normalization};
pub use parser::{ParserOptions, ParserState, Phase, SpecParser};
pub use version::{detect_version, DetectedVersion, SpecFamily, SpecVersion};
