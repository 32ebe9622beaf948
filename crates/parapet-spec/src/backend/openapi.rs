//! `openapi-spec-validator`: JSON Schema validation for Swagger 2.0 and
//! OpenAPI 3.0 documents. Requires every mapping key to be a string.

use super::schema::check_structure;
use super::{
    check_refs, check_string_keys, check_version, finish, Backend, Validate, ValidationContext,
    VersionLine,
};
use crate::document::Document;
use crate::error::ValidationError;
use crate::version::SpecFamily;

pub(super) const SUPPORTED: &[VersionLine] = &[
    VersionLine::new(SpecFamily::Swagger, 2, 0),
    VersionLine::new(SpecFamily::OpenApi, 3, 0),
];

pub(super) struct OpenApiValidator;

impl Validate for OpenApiValidator {
    fn validate(&self, document: &Document, ctx: &ValidationContext) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        check_string_keys(document, &mut issues);
        if let Some(detected) = check_version(ctx, SUPPORTED, &mut issues) {
            tracing::debug!(version = %detected, "checking structure");
            check_structure(detected.family, &document.to_json(), &mut issues);
        }
        check_refs(document, &mut issues);

        finish(Backend::OpenApiSpecValidator, issues)
    }
}
