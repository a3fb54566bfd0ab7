//! Document types for the vector gateway.
//!
//! Documents are schemaless JSON objects; the gateway only interprets the
//! fields that look like vectors (non-empty arrays of numbers) and the
//! caller-supplied external id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// True when a value is a non-empty array of numbers, the shape vector
/// fields arrive in.
fn is_vector_value(value: &Value) -> bool {
    value
        .as_array()
        .map(|items| !items.is_empty() && items.iter().all(Value::is_number))
        .unwrap_or(false)
}

/// A document to be written to or read from the search engine.
///
/// The wrapper is transparent for serde, so a document serializes as the
/// plain JSON object it wraps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorDocument {
    fields: Map<String, Value>,
}

impl VectorDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The underlying field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The document as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Dimensionality of a vector-shaped field, or `None` when the field
    /// is missing or not a numeric vector.
    pub fn vector_dims(&self, field: &str) -> Option<usize> {
        match self.fields.get(field) {
            Some(value) if is_vector_value(value) => value.as_array().map(|items| items.len()),
            _ => None,
        }
    }

    /// All vector-shaped fields with their dimensionalities, ordered by
    /// field name.
    pub fn vector_fields(&self) -> Vec<(&str, usize)> {
        self.fields
            .iter()
            .filter(|(_, value)| is_vector_value(value))
            .filter_map(|(name, value)| value.as_array().map(|items| (name.as_str(), items.len())))
            .collect()
    }
}

/// One document routed to an index, keyed by its external id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestItem {
    /// The index the document is written to.
    pub index_name: String,
    /// The caller-supplied external id. Re-ingesting an id overwrites the
    /// previous document.
    pub id: String,
    /// The document fields.
    #[serde(flatten)]
    pub document: VectorDocument,
}

impl IngestItem {
    /// Split into the bulk-write pair of external id and source document.
    ///
    /// The id is copied into the document so search hits can project it
    /// back out of `_source`.
    pub fn into_write_pair(self) -> (String, VectorDocument) {
        let mut document = self.document;
        document.insert("id", Value::String(self.id.clone()));
        (self.id, document)
    }
}
