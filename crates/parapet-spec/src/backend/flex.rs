//! `flex`: hand-written Swagger 2.0 structural checks.
//!
//! Unlike the schema-based backends, flex accepts integer mapping keys as
//! authored (a YAML `200:` response code is fine) and never asks for them to
//! be stringified.

use serde_yaml::Value;

use super::{check_refs, check_version, finish, Backend, Validate, ValidationContext, VersionLine};
use crate::document::{escape, key_text, Document};
use crate::error::{codes, ValidationError, ValidationIssue};
use crate::version::SpecFamily;

pub(super) const SUPPORTED: &[VersionLine] = &[VersionLine::new(SpecFamily::Swagger, 2, 0)];

/// Operation keys inside a Swagger 2.0 path item.
const HTTP_METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch"];

pub(super) struct FlexValidator;

impl Validate for FlexValidator {
    fn validate(&self, document: &Document, ctx: &ValidationContext) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if check_version(ctx, SUPPORTED, &mut issues).is_some() {
            check_info(document, &mut issues);
            check_paths(document, &mut issues);
        }
        check_refs(document, &mut issues);

        finish(Backend::Flex, issues)
    }
}

fn schema_issue(message: impl Into<String>, location: impl Into<String>) -> ValidationIssue {
    ValidationIssue::new(codes::SCHEMA, message).at(location)
}

fn check_info(document: &Document, issues: &mut Vec<ValidationIssue>) {
    let Some(info) = document.get("info").and_then(Value::as_mapping) else {
        issues.push(schema_issue("missing 'info' object", "/"));
        return;
    };
    for field in ["title", "version"] {
        match info.get(field) {
            Some(Value::String(_)) | Some(Value::Number(_)) => {}
            Some(_) => issues.push(schema_issue(
                format!("'info.{}' must be a scalar", field),
                format!("/info/{}", field),
            )),
            None => issues.push(schema_issue(format!("missing 'info.{}'", field), "/info")),
        }
    }
}

fn check_paths(document: &Document, issues: &mut Vec<ValidationIssue>) {
    let Some(paths) = document.get("paths").and_then(Value::as_mapping) else {
        issues.push(schema_issue("missing 'paths' object", "/"));
        return;
    };

    for (path, item) in paths {
        let path = key_text(path);
        if path.starts_with("x-") {
            continue;
        }
        let location = format!("/paths/{}", escape(&path));
        if !path.starts_with('/') {
            issues.push(schema_issue(
                format!("path '{}' must start with '/'", path),
                "/paths",
            ));
            continue;
        }
        let Some(item) = item.as_mapping() else {
            issues.push(schema_issue(
                format!("path item for '{}' must be an object", path),
                location,
            ));
            continue;
        };

        for method in HTTP_METHODS {
            let Some(operation) = item.get(*method) else {
                continue;
            };
            let op_location = format!("{}/{}", location, method);
            match operation.get("responses").and_then(Value::as_mapping) {
                Some(responses) if !responses.is_empty() => {
                    check_responses(responses, &op_location, issues)
                }
                Some(_) => issues.push(schema_issue(
                    format!("operation {} {} has no responses", method.to_uppercase(), path),
                    op_location,
                )),
                None => issues.push(schema_issue(
                    format!(
                        "operation {} {} is missing 'responses'",
                        method.to_uppercase(),
                        path
                    ),
                    op_location,
                )),
            }
        }
    }
}

fn check_responses(
    responses: &serde_yaml::Mapping,
    op_location: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let location = format!("{}/responses", op_location);
    for (code, response) in responses {
        if !is_status_key(code) {
            issues.push(schema_issue(
                format!("invalid response code '{}'", key_text(code)),
                location.clone(),
            ));
            continue;
        }
        if key_text(code).starts_with("x-") {
            continue;
        }
        let has_body = response
            .as_mapping()
            .is_some_and(|r| r.contains_key("description") || r.contains_key("$ref"));
        if !has_body {
            issues.push(schema_issue(
                format!("response '{}' needs a 'description' or '$ref'", key_text(code)),
                format!("{}/{}", location, key_text(code)),
            ));
        }
    }
}

/// Accepts `default`, `x-*`, and status codes 100-599 authored as either
/// strings or integers.
fn is_status_key(key: &Value) -> bool {
    match key {
        Value::Number(n) => n.as_u64().is_some_and(|c| (100..600).contains(&c)),
        Value::String(s) => {
            s == "default"
                || s.starts_with("x-")
                || s.parse::<u64>().is_ok_and(|c| (100..600).contains(&c)) && s.len() == 3
        }
        _ => false,
    }
}
