use crate::error::{CoreError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Object metadata carried by every document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Metadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub annotations: BTreeMap<String, String>,
}

/// A generic structured resource: the unit the engine reads and writes.
///
/// Everything outside the fixed envelope fields is kept verbatim in
/// `body`, so documents the engine never touches round-trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Document {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            metadata: Metadata {
                name: name.into(),
                ..Metadata::default()
            },
            body: Map::new(),
        }
    }

    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.metadata.labels = labels;
        self
    }

    pub fn with_body_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.body.insert(key.into(), value);
        self
    }

    /// Whole-document identity: (kind, name)
    pub fn key(&self) -> DocumentKey {
        DocumentKey {
            kind: self.kind.clone(),
            name: self.metadata.name.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Check the (kind, apiVersion) discriminator
    pub fn matches(&self, kind: &str, api_version: &str) -> bool {
        self.kind == kind && self.api_version == api_version
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Parse a document out of a generic JSON tree
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(CoreError::from)
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(CoreError::from)
    }

    /// Decode the whole document into a typed shape in a single hop.
    ///
    /// A schema mismatch surfaces as `MalformedDocument` instead of
    /// silently dropping fields through an intermediate generic tree.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let value = serde_json::to_value(self)?;
        serde_json::from_value(value).map_err(|e| {
            CoreError::malformed_document(&self.kind, &self.metadata.name, e.to_string())
        })
    }

    /// Decode one top-level body field into a typed shape
    pub fn decode_field<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.body.get(key).cloned().ok_or_else(|| {
            CoreError::malformed_document(
                &self.kind,
                &self.metadata.name,
                format!("missing `{key}` block"),
            )
        })?;
        serde_json::from_value(value).map_err(|e| {
            CoreError::malformed_document(&self.kind, &self.metadata.name, e.to_string())
        })
    }
}

/// Stable natural key for whole-document merges.
///
/// Never positional: lists may already have been reordered by a prior pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentKey {
    pub kind: String,
    pub name: String,
}

impl DocumentKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}
