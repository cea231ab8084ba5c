//! Core data model: [`Scalar`], [`Document`], [`Collection`].
//!
//! `Scalar` is a closed, typed enum rather than `serde_json::Value` — the
//! memory layer rejects payload fields it cannot type-check, and a typed
//! enum lets filter evaluation and schema validation stay exhaustive instead
//! of falling back to dynamic JSON inspection at every call site.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current on-disk schema version for [`Document`] records.
pub const DOCUMENT_SCHEMA_VERSION: u16 = 1;

/// Maximum size, in bytes, of a single payload scalar value.
pub const MAX_METADATA_VALUE_BYTES: usize = 64 * 1024;

/// The dimensionality every vector in this workspace is expected to have.
pub const EMBEDDING_DIMENSION: usize = 1536;

/// A typed payload value. Closed by design: unknown metadata shapes are
/// rejected at the boundary rather than threaded through as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl Scalar {
    /// Approximate wire size in bytes, used to enforce the metadata value
    /// cap during [`Collection`] validation.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        match self {
            Scalar::Str(s) => s.len(),
            Scalar::Int(_) => std::mem::size_of::<i64>(),
            Scalar::Float(_) => std::mem::size_of::<f64>(),
            Scalar::Bool(_) => 1,
            Scalar::Date(_) => std::mem::size_of::<NaiveDate>(),
        }
    }

    /// The field's schema type name, for schema-mismatch error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Str(_) => "str",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Bool(_) => "bool",
            Scalar::Date(_) => "date",
        }
    }
}

/// A flat, typed metadata map attached to a [`Document`].
pub type Payload = BTreeMap<String, Scalar>;

/// A fixed-dimension embedding. Two vectors produced from the same input
/// text and model identifier must be byte-identical.
pub type Vector = Vec<f32>;

/// An embedded content record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    pub vector: Vector,
    pub payload: Payload,
    /// Stable hash of the canonical content string; advisory for dedup, not
    /// a uniqueness key.
    pub content_hash: [u8; 32],
    pub schema_version: u16,
    /// Tombstoned documents are excluded from search but retain their id so
    /// it cannot be reused until garbage collection.
    pub deleted: bool,
}

/// The declared type of a payload field within a [`Collection`] schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Str,
    Int,
    Float,
    Bool,
    Date,
}

impl FieldType {
    fn matches(self, scalar: &Scalar) -> bool {
        matches!(
            (self, scalar),
            (FieldType::Str, Scalar::Str(_))
                | (FieldType::Int, Scalar::Int(_))
                | (FieldType::Float, Scalar::Float(_))
                | (FieldType::Bool, Scalar::Bool(_))
                | (FieldType::Date, Scalar::Date(_))
        )
    }
}

/// A named, typed container of [`Document`]s.
#[derive(Debug, Clone)]
pub struct Collection {
    pub name: String,
    pub dimension: usize,
    pub schema: BTreeMap<String, FieldType>,
}

impl Collection {
    /// Declares the four collections named in spec §3.
    #[must_use]
    pub fn well_known(name: &str) -> Option<Self> {
        use FieldType::{Bool, Date, Float, Str};
        let schema = match name {
            "invoices" => BTreeMap::from([
                ("vendor_name".to_string(), Str),
                ("amount".to_string(), Float),
                ("date".to_string(), Date),
                ("matched".to_string(), Bool),
            ]),
            "social_posts" => BTreeMap::from([
                ("brand".to_string(), Str),
                ("platform".to_string(), Str),
                ("published".to_string(), Bool),
                ("caption".to_string(), Str),
            ]),
            "ad_reports" => BTreeMap::from([
                ("agent_name".to_string(), Str),
                ("kind".to_string(), Str),
            ]),
            "agent_context" => BTreeMap::from([
                ("agent_name".to_string(), Str),
                ("context_type".to_string(), Str),
                ("confidence".to_string(), Float),
                ("transaction_id".to_string(), Str),
            ]),
            _ => return None,
        };
        Some(Self {
            name: name.to_string(),
            dimension: EMBEDDING_DIMENSION,
            schema,
        })
    }

    /// Validates a payload against the declared schema: rejects unknown
    /// fields, type mismatches, and oversized values.
    ///
    /// # Errors
    /// Returns a `SchemaViolation` message describing the first violation
    /// found.
    pub fn validate(&self, payload: &Payload) -> Result<(), String> {
        for (field, value) in payload {
            let Some(declared) = self.schema.get(field) else {
                return Err(format!("unknown field `{field}` for collection `{}`", self.name));
            };
            if !declared.matches(value) {
                return Err(format!(
                    "field `{field}` expected {declared:?}, got {}",
                    value.type_name()
                ));
            }
            if value.byte_len() > MAX_METADATA_VALUE_BYTES {
                return Err(format!(
                    "field `{field}` exceeds {MAX_METADATA_VALUE_BYTES} byte cap"
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_field() {
        let invoices = Collection::well_known("invoices").unwrap();
        let mut payload = Payload::new();
        payload.insert("not_a_field".to_string(), Scalar::Bool(true));
        assert!(invoices.validate(&payload).is_err());
    }

    #[test]
    fn accepts_declared_field_of_matching_type() {
        let invoices = Collection::well_known("invoices").unwrap();
        let mut payload = Payload::new();
        payload.insert("vendor_name".to_string(), Scalar::Str("SNCB".to_string()));
        assert!(invoices.validate(&payload).is_ok());
    }

    #[test]
    fn rejects_type_mismatch() {
        let invoices = Collection::well_known("invoices").unwrap();
        let mut payload = Payload::new();
        payload.insert("amount".to_string(), Scalar::Str("22.70".to_string()));
        assert!(invoices.validate(&payload).is_err());
    }
}
