//! Filesystem resource loader
//!
//! Serves resource paths relative to a root directory, e.g. the panel's
//! `mockData` folder.

use crate::document::{JsonDocumentParser, ParsedDocument};
use crate::error::LoadError;
use crate::loader::ResourceLoader;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Default maximum document size (10MB)
pub const DEFAULT_MAX_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024;

/// Loads JSON resources from files under a root directory
#[derive(Debug, Clone)]
pub struct FsResourceLoader {
    /// Directory resource paths are resolved against
    root: PathBuf,
    /// Maximum file size to parse (bytes)
    max_document_size: u64,
    parser: JsonDocumentParser,
}

impl FsResourceLoader {
    /// Create loader rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            parser: JsonDocumentParser,
        }
    }

    /// With maximum document size
    #[inline]
    #[must_use]
    pub fn with_max_document_size(mut self, bytes: u64) -> Self {
        self.max_document_size = bytes;
        self
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a resource path under the root
    ///
    /// A leading `/` is accepted (web-style paths); parent components are not.
    ///
    /// # Errors
    /// `ResourceUnavailable` if the path would escape the root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(path.trim_start_matches('/'));

        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(LoadError::unavailable(path, "path escapes the resource root"));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ResourceLoader for FsResourceLoader {
    async fn load(&self, path: &str) -> Result<ParsedDocument, LoadError> {
        let file = self.resolve(path)?;
        tracing::debug!(path, file = %file.display(), "reading resource");

        let metadata = tokio::fs::metadata(&file)
            .await
            .map_err(|e| LoadError::from_io(path, &e))?;

        // Check file size
        if metadata.len() > self.max_document_size {
            return Err(LoadError::unavailable(
                path,
                format!(
                    "document too large: {} bytes (max: {})",
                    metadata.len(),
                    self.max_document_size
                ),
            ));
        }

        let content = tokio::fs::read_to_string(&file)
            .await
            .map_err(|e| LoadError::from_io(path, &e))?;

        self.parser.parse(path, &content)
    }
}
