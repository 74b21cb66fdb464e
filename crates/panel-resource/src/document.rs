//! JSON resource documents
//!
//! Uses serde_json to turn resource text into an untyped document. No
//! entity-level validation happens here.

use crate::error::LoadError;
use serde_json::{Map, Value};

/// Untyped, syntactically valid resource document
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDocument {
    /// Top-level array (collections)
    Array(Vec<Value>),
    /// Top-level object (single records)
    Object(Map<String, Value>),
}

impl ParsedDocument {
    /// Number of top-level entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Array(items) => items.len(),
            Self::Object(fields) => fields.len(),
        }
    }

    /// Whether the document has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the records of an array document
    ///
    /// # Errors
    /// `MalformedDocument` when the document is an object.
    pub fn into_array(self, path: &str) -> Result<Vec<Value>, LoadError> {
        match self {
            Self::Array(items) => Ok(items),
            Self::Object(_) => Err(LoadError::malformed(
                path,
                "expected a JSON array, found an object",
            )),
        }
    }

    /// Take the fields of an object document
    ///
    /// # Errors
    /// `MalformedDocument` when the document is an array.
    pub fn into_object(self, path: &str) -> Result<Map<String, Value>, LoadError> {
        match self {
            Self::Object(fields) => Ok(fields),
            Self::Array(_) => Err(LoadError::malformed(
                path,
                "expected a JSON object, found an array",
            )),
        }
    }
}

/// JSON document parser
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentParser;

impl JsonDocumentParser {
    /// Create new JSON parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse resource text
    ///
    /// # Errors
    /// `MalformedDocument` when `content` is not valid JSON or its top level
    /// is a scalar.
    pub fn parse(&self, path: &str, content: &str) -> Result<ParsedDocument, LoadError> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| LoadError::malformed(path, format!("JSON parse error: {e}")))?;

        match value {
            Value::Array(items) => Ok(ParsedDocument::Array(items)),
            Value::Object(fields) => Ok(ParsedDocument::Object(fields)),
            other => Err(LoadError::malformed(
                path,
                format!("expected a JSON array or object at top level, found {other}"),
            )),
        }
    }
}
