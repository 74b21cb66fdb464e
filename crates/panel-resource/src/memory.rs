//! In-memory resource loader
//!
//! Holds named documents as text. Useful for embedding resources in a binary
//! and for tests.

use crate::document::{JsonDocumentParser, ParsedDocument};
use crate::error::LoadError;
use crate::loader::ResourceLoader;
use async_trait::async_trait;
use dashmap::DashMap;

/// Loader over documents kept in memory
#[derive(Debug, Default)]
pub struct InMemoryResourceLoader {
    documents: DashMap<String, String>,
    parser: JsonDocumentParser,
}

impl InMemoryResourceLoader {
    /// Create empty loader
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With document at path
    #[must_use]
    pub fn with_document(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Insert or replace the document at path
    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        self.documents.insert(path.into(), content.into());
    }

    /// Remove the document at path, returning its text
    pub fn remove(&self, path: &str) -> Option<String> {
        self.documents.remove(path).map(|(_, content)| content)
    }

    /// Number of documents held
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no documents are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl ResourceLoader for InMemoryResourceLoader {
    async fn load(&self, path: &str) -> Result<ParsedDocument, LoadError> {
        // Clone out so the shard lock is not held while parsing
        let content = self
            .documents
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LoadError::unavailable(path, "no such document"))?;

        self.parser.parse(path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_inserted_documents() {
        let loader = InMemoryResourceLoader::new().with_document("kpis.json", "[]");
        assert_eq!(loader.len(), 1);
        assert!(loader.load("kpis.json").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_document_is_unavailable() {
        let loader = InMemoryResourceLoader::new();
        let err = loader.load("kpis.json").await.unwrap_err();
        assert_eq!(err, LoadError::unavailable("kpis.json", "no such document"));
    }

    #[tokio::test]
    async fn replace_and_remove() {
        let loader = InMemoryResourceLoader::new().with_document("m.json", "[1]");
        loader.insert("m.json", "[1, 2]");
        assert_eq!(loader.load("m.json").await.unwrap().len(), 2);

        assert_eq!(loader.remove("m.json").as_deref(), Some("[1, 2]"));
        assert!(loader.is_empty());
    }
}
