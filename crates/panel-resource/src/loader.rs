//! Resource loader trait

use crate::document::ParsedDocument;
use crate::error::LoadError;
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches a named resource and returns it as a parsed, untyped document
///
/// Implement this trait to back the panel with a new storage (filesystem,
/// embedded assets, a remote store). Implementations perform no entity-level
/// validation.
#[async_trait]
pub trait ResourceLoader: Send + Sync + 'static {
    /// Load the resource at `path`
    ///
    /// # Errors
    /// - `LoadError::ResourceUnavailable` if the resource cannot be fetched
    /// - `LoadError::MalformedDocument` if the payload is not valid JSON
    async fn load(&self, path: &str) -> Result<ParsedDocument, LoadError>;
}

#[async_trait]
impl<L> ResourceLoader for Arc<L>
where
    L: ResourceLoader + ?Sized,
{
    async fn load(&self, path: &str) -> Result<ParsedDocument, LoadError> {
        (**self).load(path).await
    }
}
