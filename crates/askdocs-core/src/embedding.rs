//! Embedding provider trait for turning text into vectors

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Purpose of an embedding request. Retrieval models embed stored
/// documents and incoming queries differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

/// A provider that generates fixed-dimension embeddings from text.
///
/// `embed_documents` is the bulk, index-time mode; `embed_query` is the
/// single-text, request-time mode.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of document chunks, preserving input order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimensionality of the vectors produced by this provider
    fn dimensions(&self) -> usize;
}
