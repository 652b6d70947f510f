//! Metadata documents under enrichment
//!
//! A [`MetadataDocument`] is a JSON object whose key order is preserved.
//! Writes go through [`MetadataDocument::set_if_absent`] or
//! [`MetadataDocument::set_always`], so the merge policy for every field is
//! explicit at the call site.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A reference (`kref`) naming a source and an identifier within it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub source: String,
    pub id: String,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#/ckan/{}/{}", self.source, self.id)
    }
}

/// Field-level write policies for a JSON object
pub trait FieldsExt {
    /// Present and not null
    fn has_value(&self, key: &str) -> bool;

    /// Write `value` only if `key` is missing or null; returns whether it wrote
    fn set_if_absent(&mut self, key: &str, value: impl Into<Value>) -> bool;

    /// Write `value` unconditionally
    fn set_always(&mut self, key: &str, value: impl Into<Value>);
}

impl FieldsExt for Map<String, Value> {
    fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_null())
    }

    fn set_if_absent(&mut self, key: &str, value: impl Into<Value>) -> bool {
        if self.has_value(key) {
            return false;
        }
        self.insert(key.to_string(), value.into());
        true
    }

    fn set_always(&mut self, key: &str, value: impl Into<Value>) {
        self.insert(key.to_string(), value.into());
    }
}

/// A package descriptor being enriched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataDocument(Map<String, Value>);

impl MetadataDocument {
    /// An empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, which must be an object
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::data_integrity(
                "metadata document",
                format!("expected a JSON object, found {}", json_kind(&other)),
            )),
        }
    }

    /// The reference in `kref`, if it has a string source and id
    pub fn reference(&self) -> Option<Reference> {
        let kref = self.0.get("kref")?.as_object()?;
        let source = kref.get("source")?.as_str()?.to_string();
        let id = match kref.get("id")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(Reference { source, id })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.0.has_value(key)
    }

    pub fn set_if_absent(&mut self, key: &str, value: impl Into<Value>) -> bool {
        self.0.set_if_absent(key, value)
    }

    pub fn set_always(&mut self, key: &str, value: impl Into<Value>) {
        self.0.set_always(key, value)
    }

    /// The object stored under `key`, created empty if missing or null
    ///
    /// Fails if `key` holds something other than an object.
    pub fn object_mut(&mut self, key: &str) -> Result<&mut Map<String, Value>> {
        let entry = self.0.entry(key).or_insert(Value::Null);
        if entry.is_null() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => Ok(map),
            other => Err(Error::data_integrity(
                key,
                format!("expected an object, found {}", json_kind(other)),
            )),
        }
    }

    pub fn as_json(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.0)
    }

    pub fn to_pretty_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    /// Read a document from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
        content.parse::<Self>().map_err(|e| Error::Document {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
    }

    /// Write the document to a file as pretty-printed JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut json = self.to_pretty_string()?;
        json.push('\n');
        tokio::fs::write(path, json)
            .await
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl FromStr for MetadataDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json(serde_json::from_str(s)?)
    }
}

impl fmt::Display for MetadataDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
