//! Decoder protocol
//!
//! Every entity type turns one untyped JSON value into itself or a
//! [`DecodeError`] naming the offending field. Decoders never panic, so one
//! corrupt record cannot take its siblings down with it.

use crate::id::{EntityId, EntityKind};
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Field name reported when the record itself is not a JSON object
pub const RECORD_FIELD: &str = "<record>";

/// Calendar date format of date fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-type decode contract
pub trait Decodable: Sized {
    /// Decode one raw record
    ///
    /// # Errors
    /// Returns [`DecodeError`] when a required field is missing or has the
    /// wrong primitive shape.
    fn decode(raw: &Value) -> Result<Self, DecodeError>;
}

/// Why a field was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// Required field absent (or null)
    #[error("missing required field")]
    Missing,

    /// Field present with the wrong JSON shape
    #[error("expected {expected}")]
    WrongType { expected: &'static str },

    /// String that is not an ISO-8601 calendar date
    #[error("invalid date: {reason}")]
    InvalidDate { reason: String },

    /// Id already taken by an earlier record of the same collection
    #[error("duplicate id {id}")]
    DuplicateId { id: EntityId },
}

/// Record-level decode failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot decode {kind} field '{field}': {violation} (raw: {raw})")]
pub struct DecodeError {
    /// Entity type being decoded
    pub kind: EntityKind,
    /// Offending field, `<record>` for the whole value
    pub field: String,
    /// What was wrong with it
    pub violation: Violation,
    /// The raw offending value (`null` when missing)
    pub raw: Value,
}

impl DecodeError {
    /// Create decode error for field
    pub fn new(kind: EntityKind, field: impl Into<String>, violation: Violation, raw: Value) -> Self {
        Self {
            kind,
            field: field.into(),
            violation,
            raw,
        }
    }

    /// Create missing-field error
    pub fn missing(kind: EntityKind, field: impl Into<String>) -> Self {
        Self::new(kind, field, Violation::Missing, Value::Null)
    }

    /// Create duplicate-id error
    pub fn duplicate_id(kind: EntityKind, id: EntityId) -> Self {
        Self::new(kind, "id", Violation::DuplicateId { id }, Value::from(id.get()))
    }

    /// Create wrong-type error
    pub fn wrong_type(
        kind: EntityKind,
        field: impl Into<String>,
        expected: &'static str,
        raw: &Value,
    ) -> Self {
        Self::new(kind, field, Violation::WrongType { expected }, raw.clone())
    }
}

/// Typed field access over one raw JSON object
///
/// Implements the shape checks shared by all decoders. Unknown fields are
/// ignored and `null` counts as absent.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    kind: EntityKind,
    fields: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    /// Open a raw record for reading
    ///
    /// # Errors
    /// Fails with a `<record>` error when `raw` is not a JSON object.
    pub fn new(kind: EntityKind, raw: &'a Value) -> Result<Self, DecodeError> {
        match raw {
            Value::Object(fields) => Ok(Self { kind, fields }),
            other => Err(DecodeError::wrong_type(kind, RECORD_FIELD, "object", other)),
        }
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    fn required(&self, field: &str) -> Result<&'a Value, DecodeError> {
        self.present(field)
            .ok_or_else(|| DecodeError::missing(self.kind, field))
    }

    fn as_id(&self, field: &str, value: &Value) -> Result<EntityId, DecodeError> {
        value
            .as_u64()
            .map(EntityId::new)
            .ok_or_else(|| DecodeError::wrong_type(self.kind, field, "non-negative integer", value))
    }

    fn as_string(&self, field: &str, value: &Value) -> Result<String, DecodeError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| DecodeError::wrong_type(self.kind, field, "string", value))
    }

    /// Required integer id
    pub fn id(&self, field: &str) -> Result<EntityId, DecodeError> {
        let value = self.required(field)?;
        self.as_id(field, value)
    }

    /// Required string
    pub fn string(&self, field: &str) -> Result<String, DecodeError> {
        let value = self.required(field)?;
        self.as_string(field, value)
    }

    /// Optional string
    pub fn optional_string(&self, field: &str) -> Result<Option<String>, DecodeError> {
        self.present(field)
            .map(|value| self.as_string(field, value))
            .transpose()
    }

    /// Optional boolean
    pub fn optional_bool(&self, field: &str) -> Result<Option<bool>, DecodeError> {
        self.present(field)
            .map(|value| {
                value
                    .as_bool()
                    .ok_or_else(|| DecodeError::wrong_type(self.kind, field, "boolean", value))
            })
            .transpose()
    }

    /// Required `YYYY-MM-DD` date
    pub fn date(&self, field: &str) -> Result<NaiveDate, DecodeError> {
        let value = self.required(field)?;
        let text = value
            .as_str()
            .ok_or_else(|| DecodeError::wrong_type(self.kind, field, "date string", value))?;

        NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| {
            DecodeError::new(
                self.kind,
                field,
                Violation::InvalidDate {
                    reason: e.to_string(),
                },
                value.clone(),
            )
        })
    }

    /// Required array of ids
    ///
    /// A bad element is reported as `field[index]`.
    pub fn id_list(&self, field: &str) -> Result<Vec<EntityId>, DecodeError> {
        let value = self.required(field)?;
        let items = value
            .as_array()
            .ok_or_else(|| DecodeError::wrong_type(self.kind, field, "array of ids", value))?;

        items
            .iter()
            .enumerate()
            .map(|(index, item)| self.as_id(&format!("{field}[{index}]"), item))
            .collect()
    }
}
