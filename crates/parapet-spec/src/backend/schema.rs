//! Embedded structural schemas, compiled once per process.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;

use crate::error::{codes, ValidationIssue};
use crate::version::SpecFamily;

const SWAGGER_2_0: &str = include_str!("schemas/swagger-2.0.json");
const OPENAPI_3_0: &str = include_str!("schemas/openapi-3.0.json");

type Compiled = Result<Validator, String>;

fn compile(source: &str) -> Compiled {
    let schema: Value =
        serde_json::from_str(source).map_err(|e| format!("invalid embedded schema: {}", e))?;
    jsonschema::validator_for(&schema).map_err(|e| format!("invalid embedded schema: {}", e))
}

fn compiled(family: SpecFamily) -> &'static Compiled {
    static SWAGGER: OnceLock<Compiled> = OnceLock::new();
    static OPENAPI: OnceLock<Compiled> = OnceLock::new();
    match family {
        SpecFamily::Swagger => SWAGGER.get_or_init(|| compile(SWAGGER_2_0)),
        SpecFamily::OpenApi => OPENAPI.get_or_init(|| compile(OPENAPI_3_0)),
    }
}

/// Validate a JSON view of the document against the family's schema.
pub(super) fn check_structure(
    family: SpecFamily,
    instance: &Value,
    issues: &mut Vec<ValidationIssue>,
) {
    let validator = match compiled(family) {
        Ok(v) => v,
        Err(e) => {
            issues.push(ValidationIssue::new(codes::SCHEMA, e.clone()));
            return;
        }
    };

    for error in validator.iter_errors(instance) {
        let location = error.instance_path.to_string();
        let issue = ValidationIssue::new(codes::SCHEMA, error.to_string());
        issues.push(if location.is_empty() {
            issue
        } else {
            issue.at(location)
        });
    }
}
