//! `$ref` reachability checks.
//!
//! References are checked, not inlined. Only local references (`#/...`) can
//! be verified; anything else is reported as external.
//!
//! A `$ref` key is only read where a Reference Object can appear. Names in
//! named maps (`properties`, `definitions`, ...) and example or default
//! payloads are user data and are never treated as references.

use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_yaml::Value;

use crate::document::{escape, key_text, lookup, Document};

/// Keys whose mapping value is keyed by user-chosen names.
const NAMED_MAPS: &[&str] = &[
    "properties",
    "patternProperties",
    "definitions",
    "parameters",
    "responses",
    "securityDefinitions",
    "schemas",
    "requestBodies",
    "headers",
    "securitySchemes",
    "links",
    "callbacks",
    "encoding",
    "content",
    "variables",
    "mapping",
    "scopes",
];

/// Keys whose value is an opaque payload.
const DATA_KEYS: &[&str] = &["example", "default", "enum"];

/// A `$ref` that does not point anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefIssue {
    /// Pointer to the object holding the `$ref`.
    pub location: String,
    /// The reference text, or a description when it is not a string.
    pub reference: String,
    pub reason: RefProblem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefProblem {
    /// The target does not exist in this document.
    Unresolved,
    /// `$ref` is not a string.
    NotAString,
}

/// Every local `$ref` that cannot be resolved against the document root.
pub fn unresolved_refs(document: &Document) -> Vec<RefIssue> {
    let mut issues = Vec::new();
    let mut visit = |location: &str, target: &Value| match target {
        Value::String(reference) => {
            if let Some(fragment) = reference.strip_prefix('#') {
                if resolve_fragment(document, fragment).is_none() {
                    issues.push(RefIssue {
                        location: location.to_string(),
                        reference: reference.clone(),
                        reason: RefProblem::Unresolved,
                    });
                }
            }
        }
        other => issues.push(RefIssue {
            location: location.to_string(),
            reference: key_text(other),
            reason: RefProblem::NotAString,
        }),
    };
    walk(document.root(), String::new(), Node::Object, &mut visit);
    issues
}

/// Every `$ref` pointing outside the document, as `(location, reference)`.
pub fn external_refs(document: &Document) -> Vec<(String, String)> {
    let mut refs = Vec::new();
    let mut visit = |location: &str, target: &Value| {
        if let Some(reference) = target.as_str() {
            if !reference.starts_with('#') {
                refs.push((location.to_string(), reference.to_string()));
            }
        }
    };
    walk(document.root(), String::new(), Node::Object, &mut visit);
    refs
}

/// Resolve a URI fragment (without `#`). The fragment is percent-decoded
/// before it is read as a JSON pointer, so `~1pets~1%7Bid%7D` reaches
/// `/pets/{id}`.
fn resolve_fragment<'a>(document: &'a Document, fragment: &str) -> Option<&'a Value> {
    let pointer = percent_decode_str(fragment).decode_utf8().ok()?;
    lookup(document.root(), &pointer)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    /// A spec object or schema; may hold a `$ref`.
    Object,
    /// A map from user-chosen names to objects.
    Named,
    /// An `examples` map.
    Examples,
    /// An `examples` entry: a Reference Object or a payload.
    Example,
}

fn walk(value: &Value, location: String, node: Node, visit: &mut dyn FnMut(&str, &Value)) {
    match value {
        Value::Mapping(map) => {
            if matches!(node, Node::Object | Node::Example) {
                if let Some(target) = map.get("$ref") {
                    visit(if location.is_empty() { "/" } else { &location }, target);
                }
            }
            if node == Node::Example {
                return;
            }
            for (key, child) in map {
                let name = key_text(key);
                let child_node = match node {
                    Node::Named => Node::Object,
                    Node::Examples => Node::Example,
                    _ if DATA_KEYS.contains(&name.as_str()) || name.starts_with("x-") => continue,
                    _ if name == "examples" => Node::Examples,
                    _ if NAMED_MAPS.contains(&name.as_str()) => Node::Named,
                    _ => Node::Object,
                };
                walk(child, format!("{}/{}", location, escape(&name)), child_node, visit);
            }
        }
        Value::Sequence(seq) => {
            for (idx, child) in seq.iter().enumerate() {
                walk(child, format!("{}/{}", location, idx), Node::Object, visit);
            }
        }
        Value::Tagged(tagged) => walk(&tagged.value, location, node, visit),
        _ => {}
    }
}
