//! Document indexer trait and types

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A source document to be split and indexed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub metadata: serde_json::Value,
}

/// Result of an indexing operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexingResult {
    pub documents_indexed: usize,
    pub chunks_indexed: usize,
    pub documents_failed: usize,
    pub errors: Vec<String>,
}

impl IndexingResult {
    /// Fold another result into this one
    pub fn merge(&mut self, other: IndexingResult) {
        self.documents_indexed += other.documents_indexed;
        self.chunks_indexed += other.chunks_indexed;
        self.documents_failed += other.documents_failed;
        self.errors.extend(other.errors);
    }
}

/// Configuration for document indexing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            batch_size: 100,
        }
    }
}

/// Trait for document indexers
///
/// Indexing is an offline batch step: documents are chunked, embedded in
/// document mode and written to a vector store. It never runs at request time.
#[async_trait]
pub trait DocumentIndexer: Send + Sync {
    /// Index a single document
    async fn index_document(&self, document: Document) -> Result<IndexingResult>;

    /// Index multiple documents
    async fn index_documents(&self, documents: Vec<Document>) -> Result<IndexingResult>;

    /// Index every regular file in a directory
    async fn index_directory(&self, dir: &Path) -> Result<IndexingResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing_defaults() {
        let config = IndexingConfig::default();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_indexing_result_merge() {
        let mut total = IndexingResult::default();
        total.merge(IndexingResult {
            documents_indexed: 1,
            chunks_indexed: 4,
            documents_failed: 0,
            errors: Vec::new(),
        });
        total.merge(IndexingResult {
            documents_indexed: 0,
            chunks_indexed: 0,
            documents_failed: 1,
            errors: vec!["notes.bin: stream did not contain valid UTF-8".to_string()],
        });

        assert_eq!(total.documents_indexed, 1);
        assert_eq!(total.chunks_indexed, 4);
        assert_eq!(total.documents_failed, 1);
        assert_eq!(total.errors.len(), 1);
    }
}
