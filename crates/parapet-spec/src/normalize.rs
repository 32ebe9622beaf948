//! Key normalization for lenient mode.
//!
//! Many validators require mapping keys such as response status codes to be
//! strings, but YAML happily parses a bare `200:` as an integer. In lenient
//! mode the parser rewrites those keys before any backend sees the document.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::document::{escape, key_text, Document};

/// A mapping key that is not a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyIssue {
    /// Pointer to the mapping that holds the key.
    pub location: String,
    /// The key rendered as text.
    pub key: String,
}

/// Result of [`stringify_keys`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Normalization {
    /// Integer keys rewritten to strings.
    pub rewritten: usize,
    /// Integer keys dropped because the mapping already held the same key
    /// as a string.
    pub shadowed: Vec<KeyIssue>,
}

/// Rewrite every integer-valued mapping key to its decimal string form.
///
/// Values, key order and all other keys are left untouched. If a mapping
/// holds both `200` and `"200"`, the string-authored entry wins wherever it
/// appears and the integer entry is reported in
/// [`Normalization::shadowed`].
pub fn stringify_keys(document: &mut Document) -> Normalization {
    let mut report = Normalization::default();
    stringify_value(document.root_mut(), String::new(), &mut report);
    report
}

fn stringify_value(value: &mut Value, location: String, report: &mut Normalization) {
    match value {
        Value::Mapping(map) => {
            if map.keys().any(is_integer) {
                stringify_mapping(map, &location, report);
            }
            for (key, child) in map.iter_mut() {
                let child_location = format!("{}/{}", location, escape(&key_text(key)));
                stringify_value(child, child_location, report);
            }
        }
        Value::Sequence(seq) => {
            for (idx, child) in seq.iter_mut().enumerate() {
                stringify_value(child, format!("{}/{}", location, idx), report);
            }
        }
        Value::Tagged(tagged) => stringify_value(&mut tagged.value, location, report),
        _ => {}
    }
}

fn stringify_mapping(map: &mut Mapping, location: &str, report: &mut Normalization) {
    let authored: Vec<String> = map
        .keys()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    let mut rebuilt = Mapping::with_capacity(map.len());
    for (key, value) in std::mem::take(map) {
        if !is_integer(&key) {
            rebuilt.insert(key, value);
            continue;
        }
        let text = key_text(&key);
        if authored.contains(&text) {
            let location = if location.is_empty() { "/" } else { location };
            tracing::warn!(location, key = %text, "dropping integer key shadowed by string key");
            report.shadowed.push(KeyIssue {
                location: location.to_string(),
                key: text,
            });
            continue;
        }
        rebuilt.insert(Value::String(text), value);
        report.rewritten += 1;
    }
    *map = rebuilt;
}

fn is_integer(key: &Value) -> bool {
    matches!(key, Value::Number(n) if n.is_i64() || n.is_u64())
}

/// List every mapping key in the document that is not a string.
pub fn non_string_keys(document: &Document) -> Vec<KeyIssue> {
    let mut issues = Vec::new();
    collect_non_string(document.root(), String::new(), &mut issues);
    issues
}

fn collect_non_string(value: &Value, location: String, issues: &mut Vec<KeyIssue>) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                if !key.is_string() {
                    issues.push(KeyIssue {
                        location: if location.is_empty() {
                            "/".to_string()
                        } else {
                            location.clone()
                        },
                        key: key_text(key),
                    });
                }
                collect_non_string(child, format!("{}/{}", location, escape(&key_text(key))), issues);
            }
        }
        Value::Sequence(seq) => {
            for (idx, child) in seq.iter().enumerate() {
                collect_non_string(child, format!("{}/{}", location, idx), issues);
            }
        }
        Value::Tagged(tagged) => collect_non_string(&tagged.value, location, issues),
        _ => {}
    }
}
