//! `swagger-spec-validator`: Swagger 2.0 validation against an embedded
//! JSON Schema. Requires every mapping key to be a string.

use super::schema::check_structure;
use super::{
    check_refs, check_string_keys, check_version, finish, Backend, Validate, ValidationContext,
    VersionLine,
};
use crate::document::Document;
use crate::error::ValidationError;
use crate::version::SpecFamily;

pub(super) const SUPPORTED: &[VersionLine] = &[VersionLine::new(SpecFamily::Swagger, 2, 0)];

pub(super) struct SwaggerValidator;

impl Validate for SwaggerValidator {
    fn validate(&self, document: &Document, ctx: &ValidationContext) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        check_string_keys(document, &mut issues);
        if let Some(detected) = check_version(ctx, SUPPORTED, &mut issues) {
            check_structure(detected.family, &document.to_json(), &mut issues);
        }
        check_refs(document, &mut issues);

        finish(Backend::SwaggerSpecValidator, issues)
    }
}
