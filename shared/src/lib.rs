//! # Shared Types
//!
//! Types and pure logic shared between the backend and the browser frontend:
//! the record wire format, the error response schema, the entity schemas,
//! and the client-side shaping rules (form serialization, card rendering,
//! list filtering).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod client;
pub mod filter;
pub mod form;
pub mod render;
pub mod schema;

pub use client::{ApiFailure, DeleteRequest, PageState};
pub use filter::{FilterBar, FilterOption, RecordFilter};
pub use form::{ControlValue, FormControl};
pub use render::{Card, ListView};
pub use schema::{EntityKind, EntitySchema, FieldKind, FieldSpec, FilterSpec, ValidationError};

/// A field mapping as sent by the client or stored by the server (no id).
pub type Fields = Map<String, Value>;

/// A stored record: the store-assigned id plus its field mapping.
///
/// Serializes flat, e.g. `{"id": "...", "name": "Tom", "isAdopted": false}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Raw value of a field, if present
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// True when the field holds something other than null or a blank string
    pub fn has(&self, field: &str) -> bool {
        match self.fields.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Display text for a field; missing and null fields yield an empty string
    pub fn text(&self, field: &str) -> String {
        self.fields.get(field).map(value_to_text).unwrap_or_default()
    }

    /// Numeric value of a field, if it holds a number
    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_f64)
    }
}

/// Failure body emitted by every API endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiErrorBody {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Answer of `GET /entity`: the entity type the server is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub entity: EntityKind,
}

/// Where a save request goes, decided by the presence of an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Create,
    Update(String),
}

impl SaveTarget {
    /// Picks update when the mapping carries a truthy `id`, create otherwise.
    pub fn for_fields(fields: &Fields) -> Self {
        match fields.get("id") {
            Some(Value::String(id)) if !id.is_empty() => SaveTarget::Update(id.clone()),
            Some(Value::Number(n)) if n.as_f64() != Some(0.0) => SaveTarget::Update(n.to_string()),
            _ => SaveTarget::Create,
        }
    }

    pub fn path(&self) -> String {
        match self {
            SaveTarget::Create => "/data".to_string(),
            SaveTarget::Update(id) => format!("/data/{}", id),
        }
    }
}

/// Removes any client-supplied `id`; ids are only ever assigned by the store.
pub fn strip_id(mut fields: Fields) -> Fields {
    fields.remove("id");
    fields
}

/// Text form of a JSON value as it would appear in a form control or card
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Loose truthiness used for checkbox state: null, false, 0 and "" are false
pub fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
