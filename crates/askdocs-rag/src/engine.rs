//! RAG engine implementation

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use askdocs_core::{
    EmbeddingProvider, Error, RAGEngine, RAGQuery, RAGResult, Result, SearchConfig, VectorStore,
};

/// Request-time retrieval: embed the query, search the store, join the hits.
pub struct LocalRAGEngine<V: VectorStore, E: EmbeddingProvider> {
    vector_store: Arc<V>,
    embeddings: Arc<E>,
}

impl<V: VectorStore, E: EmbeddingProvider> LocalRAGEngine<V, E> {
    /// Create a new engine over a connected vector store
    pub fn new(vector_store: Arc<V>, embeddings: Arc<E>) -> Self {
        Self {
            vector_store,
            embeddings,
        }
    }
}

#[async_trait]
impl<V, E> RAGEngine for LocalRAGEngine<V, E>
where
    V: VectorStore + 'static,
    E: EmbeddingProvider + 'static,
{
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult> {
        if !self.vector_store.is_connected() {
            return Err(Error::RAGEngine("Vector store not connected".to_string()));
        }

        let vector = self.embeddings.embed_query(&query.query).await?;
        let search_config = SearchConfig {
            top_k: query.top_k,
            score_threshold: query.score_threshold,
        };

        let search_result = self
            .vector_store
            .search_by_vector(&vector, &search_config)
            .await?;
        let context = self.build_context(&search_result.documents);

        debug!(top_k = query.top_k, results = search_result.total, "retrieved chunks");

        Ok(RAGResult {
            documents: search_result.documents,
            context,
        })
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        let vector_count = self.vector_store.count().await?;

        Ok(json!({
            "ready": self.is_ready(),
            "vector_store_count": vector_count,
            "embedding_dimensions": self.embeddings.dimensions(),
        }))
    }

    fn is_ready(&self) -> bool {
        self.vector_store.is_connected()
    }
}
