//! In-memory specification tree.
//!
//! Backed by `serde_yaml::Value` so that non-string mapping keys (a bare
//! `200:` response code, for example) survive loading as authored.

use std::path::Path;

use serde_yaml::Value;

use crate::error::LoadError;

/// A loaded Swagger/OpenAPI document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parse a document from a YAML/JSON string.
    pub fn from_text(input: &str) -> Result<Self, LoadError> {
        // JSON is valid YAML
        let root: Value =
            serde_yaml::from_str(input).map_err(|e| LoadError::Syntax(e.to_string()))?;
        Self::from_value(root)
    }

    /// Read and parse a document from a file path.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_text(&content)
    }

    /// Wrap an already-parsed tree. The root must be a mapping.
    pub fn from_value(root: Value) -> Result<Self, LoadError> {
        if !root.is_mapping() {
            return Err(LoadError::NotAMapping);
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    /// Look up a root-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Look up a node by JSON pointer (`/paths/~1pets/get`).
    ///
    /// An empty pointer addresses the root. Segments match string keys
    /// first, then integer keys with the same decimal text.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        lookup(&self.root, pointer)
    }

    /// Re-serialize the tree as YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.root)
    }

    /// Convert to a JSON value. Non-string scalar keys are stringified.
    pub fn to_json(&self) -> serde_json::Value {
        yaml_to_json(&self.root)
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}

/// Resolve a JSON pointer against a YAML tree.
pub(crate) fn lookup<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    if pointer.is_empty() {
        return Some(root);
    }
    let rest = pointer.strip_prefix('/')?;
    let mut current = root;
    for segment in rest.split('/') {
        let unescaped = unescape(segment);
        current = match current {
            Value::Mapping(map) => map
                .get(unescaped.as_str())
                .or_else(|| integer_key(&unescaped).and_then(|k| map.get(&k)))?,
            Value::Sequence(seq) => seq.get(unescaped.parse::<usize>().ok()?)?,
            Value::Tagged(tagged) => lookup(&tagged.value, &format!("/{}", segment))?,
            _ => return None,
        };
    }
    Some(current)
}

fn integer_key(segment: &str) -> Option<Value> {
    if let Ok(i) = segment.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    segment.parse::<u64>().ok().map(|u| Value::Number(u.into()))
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Escape a key for use as a JSON pointer segment.
pub(crate) fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Render a mapping key as text.
pub(crate) fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn yaml_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::from(i)
            } else if let Some(u) = n.as_u64() {
                serde_json::Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            }
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(seq) => serde_json::Value::Array(seq.iter().map(yaml_to_json).collect()),
        Value::Mapping(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (key_text(k), yaml_to_json(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}
