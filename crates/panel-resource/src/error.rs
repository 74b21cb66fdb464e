//! Error types for the resource layer
//!
//! Collection-level failures only. Record-level decode failures are
//! [`panel_entity::DecodeError`] and never abort a load.

use std::time::Duration;

/// Errors while fetching or parsing a resource document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The resource could not be fetched or read
    #[error("resource unavailable: {path}: {reason}")]
    ResourceUnavailable { path: String, reason: String },

    /// The payload is not syntactically valid JSON of the expected shape
    #[error("malformed document {path}: {message}")]
    MalformedDocument { path: String, message: String },

    /// The fetch did not finish within the caller's deadline
    #[error("loading {path} timed out after {after:?}")]
    Timeout { path: String, after: Duration },
}

impl LoadError {
    /// Create unavailable error for path
    pub fn unavailable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create malformed-document error for path
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classify an IO error for path
    ///
    /// Undecodable bytes are a document problem; everything else means the
    /// resource could not be read.
    pub fn from_io(path: impl Into<String>, error: &std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::InvalidData => Self::malformed(path, error.to_string()),
            _ => Self::unavailable(path, error.to_string()),
        }
    }

    /// Path of the resource that failed
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::ResourceUnavailable { path, .. }
            | Self::MalformedDocument { path, .. }
            | Self::Timeout { path, .. } => path,
        }
    }
}

/// Result type alias for resource operations
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_display() {
        let err = LoadError::unavailable("kpis.json", "no such file");
        assert_eq!(err.to_string(), "resource unavailable: kpis.json: no such file");
    }

    #[test]
    fn io_error_classification() {
        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            LoadError::from_io("a.json", &not_found),
            LoadError::ResourceUnavailable { .. }
        ));

        let bad_utf8 = std::io::Error::new(std::io::ErrorKind::InvalidData, "stream did not contain valid UTF-8");
        assert!(matches!(
            LoadError::from_io("a.json", &bad_utf8),
            LoadError::MalformedDocument { .. }
        ));
    }

    #[test]
    fn path_accessor() {
        let err = LoadError::Timeout {
            path: "machines.json".into(),
            after: Duration::from_millis(50),
        };
        assert_eq!(err.path(), "machines.json");
    }
}
