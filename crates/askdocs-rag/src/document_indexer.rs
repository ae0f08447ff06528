//! Document indexer implementation

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use askdocs_core::{
    Document, DocumentIndexer, EmbeddingProvider, Error, IndexingConfig, IndexingResult, Result,
    VectorDocument, VectorStore,
};

use crate::splitter::RecursiveTextSplitter;

/// Offline indexer: split, embed in document mode, store.
///
/// Chunk ids are `{document_id}_{chunk_index}`, so indexing the same
/// directory twice overwrites chunks instead of duplicating them.
pub struct LocalDocumentIndexer<V: VectorStore, E: EmbeddingProvider> {
    vector_store: Arc<V>,
    embeddings: Arc<E>,
    splitter: RecursiveTextSplitter,
    config: IndexingConfig,
}

impl<V: VectorStore, E: EmbeddingProvider> LocalDocumentIndexer<V, E> {
    /// Create a new indexer with the default 500/50 chunking
    pub fn new(vector_store: Arc<V>, embeddings: Arc<E>) -> Self {
        Self {
            vector_store,
            embeddings,
            splitter: RecursiveTextSplitter::default(),
            config: IndexingConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(
        vector_store: Arc<V>,
        embeddings: Arc<E>,
        config: IndexingConfig,
    ) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(Error::Configuration(
                "indexing batch size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            vector_store,
            embeddings,
            splitter: RecursiveTextSplitter::from_config(&config)?,
            config,
        })
    }

    fn document_from_file(path: &Path, content: String) -> Document {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Document {
            id: filename.clone(),
            title: filename.clone(),
            content,
            metadata: json!({ "source": filename }),
        }
    }

    /// Embed every chunk of a document, then store them in one batch so a
    /// document is either fully indexed or not at all
    async fn embed_and_store(&self, mut chunks: Vec<VectorDocument>) -> Result<usize> {
        for batch in chunks.chunks_mut(self.config.batch_size) {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.content.clone()).collect();

            let vectors = self.embeddings.embed_documents(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            for (chunk, vector) in batch.iter_mut().zip(vectors) {
                chunk.embedding = Some(vector);
            }
        }

        Ok(self.vector_store.store_batch(chunks).await?.len())
    }
}

#[async_trait]
impl<V, E> DocumentIndexer for LocalDocumentIndexer<V, E>
where
    V: VectorStore + 'static,
    E: EmbeddingProvider + 'static,
{
    async fn index_document(&self, document: Document) -> Result<IndexingResult> {
        let pieces = self.splitter.split_text(&document.content);
        let total_chunks = pieces.len();
        let indexed_at = Utc::now().to_rfc3339();

        let chunks: Vec<VectorDocument> = pieces
            .into_iter()
            .enumerate()
            .map(|(i, content)| {
                let mut metadata = document.metadata.clone();
                if !metadata.is_object() {
                    metadata = json!({});
                }
                metadata["chunk_index"] = json!(i);
                metadata["total_chunks"] = json!(total_chunks);
                metadata["title"] = json!(document.title);
                metadata["indexed_at"] = json!(indexed_at);

                VectorDocument {
                    id: format!("{}_{}", document.id, i),
                    content,
                    embedding: None,
                    metadata,
                    score: None,
                }
            })
            .collect();

        let chunks_indexed = self.embed_and_store(chunks).await?;
        debug!(document = %document.id, chunks = chunks_indexed, "indexed document");

        Ok(IndexingResult {
            documents_indexed: 1,
            chunks_indexed,
            documents_failed: 0,
            errors: Vec::new(),
        })
    }

    async fn index_documents(&self, documents: Vec<Document>) -> Result<IndexingResult> {
        let mut total = IndexingResult::default();

        for document in documents {
            let id = document.id.clone();
            match self.index_document(document).await {
                Ok(result) => total.merge(result),
                Err(e) => {
                    warn!(document = %id, error = %e, "failed to index document");
                    total.documents_failed += 1;
                    total.errors.push(format!("Failed to index document {}: {}", id, e));
                }
            }
        }

        self.vector_store.persist().await?;
        Ok(total)
    }

    async fn index_directory(&self, dir: &Path) -> Result<IndexingResult> {
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            Error::DocumentIndexer(format!("cannot read {}: {}", dir.display(), e))
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        let mut unreadable = IndexingResult::default();
        for path in paths {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => documents.push(Self::document_from_file(&path, content)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    unreadable.documents_failed += 1;
                    unreadable
                        .errors
                        .push(format!("Failed to read {}: {}", path.display(), e));
                }
            }
        }

        info!(dir = %dir.display(), files = documents.len(), "indexing directory");
        let mut result = self.index_documents(documents).await?;
        result.merge(unreadable);
        Ok(result)
    }
}
