//! Vector store implementations

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use askdocs_core::{Error, Result, SearchConfig, SearchResult, VectorDocument, VectorStore};

/// File written inside the persistence directory of a [`LocalVectorStore`]
pub const INDEX_FILE: &str = "index.json";

#[derive(Serialize, Deserialize)]
struct StoreFile {
    dimensions: Option<usize>,
    documents: Vec<VectorDocument>,
}

/// Local vector store: an in-memory cosine-similarity scan, optionally
/// persisted as JSON in a directory.
pub struct LocalVectorStore {
    documents: RwLock<HashMap<String, VectorDocument>>,
    persist_dir: Option<PathBuf>,
    connected: bool,
}

impl LocalVectorStore {
    /// Create a new in-memory vector store
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            persist_dir: None,
            connected: false,
        }
    }

    /// Create a store backed by `dir`; existing data is loaded on connect
    pub fn persistent(dir: impl Into<PathBuf>) -> Self {
        Self {
            persist_dir: Some(dir.into()),
            ..Self::new()
        }
    }

    /// Simple cosine similarity calculation
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(Error::VectorStore("vector store not connected".to_string()))
        }
    }

    async fn load(dir: &Path) -> Result<Vec<VectorDocument>> {
        let path = dir.join(INDEX_FILE);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read(&path).await?;
        let file: StoreFile = serde_json::from_slice(&content).map_err(|e| {
            Error::VectorStore(format!("corrupt index file {}: {}", path.display(), e))
        })?;
        Ok(file.documents)
    }
}

impl Default for LocalVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn connect(&mut self) -> Result<()> {
        if let Some(dir) = &self.persist_dir {
            let loaded = Self::load(dir).await?;
            info!(path = %dir.display(), documents = loaded.len(), "loaded local vector store");
            let mut docs = self.documents.write().await;
            for document in loaded {
                docs.insert(document.id.clone(), document);
            }
        }
        self.connected = true;
        Ok(())
    }

    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        self.ensure_connected()?;
        let mut docs = self.documents.write().await;

        // The whole batch is checked before anything is inserted
        let mut dimensions = docs
            .values()
            .find_map(|doc| doc.embedding.as_ref().map(Vec::len));
        for document in &documents {
            let len = match &document.embedding {
                Some(embedding) => embedding.len(),
                None => {
                    return Err(Error::VectorStore(format!(
                        "document {} has no embedding",
                        document.id
                    )));
                }
            };
            match dimensions {
                Some(expected) if expected != len => {
                    return Err(Error::VectorStore(format!(
                        "embedding dimension mismatch for {}: expected {}, got {}",
                        document.id, expected, len
                    )));
                }
                _ => dimensions = Some(len),
            }
        }

        let ids = documents.iter().map(|doc| doc.id.clone()).collect();
        for document in documents {
            docs.insert(document.id.clone(), document);
        }

        Ok(ids)
    }

    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        self.ensure_connected()?;
        let docs = self.documents.read().await;

        let mut results: Vec<VectorDocument> = docs
            .values()
            .filter_map(|doc| {
                let embedding = doc.embedding.as_ref()?;
                let score = Self::cosine_similarity(vector, embedding);
                Some(VectorDocument {
                    id: doc.id.clone(),
                    content: doc.content.clone(),
                    embedding: None,
                    metadata: doc.metadata.clone(),
                    score: Some(score),
                })
            })
            .filter(|doc| match config.score_threshold {
                Some(threshold) => doc.score.unwrap_or(0.0) >= threshold,
                None => true,
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(config.top_k);

        let total = results.len();
        debug!(top_k = config.top_k, returned = total, "local vector search");

        Ok(SearchResult {
            documents: results,
            total,
        })
    }

    async fn clear(&self) -> Result<()> {
        self.documents.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.read().await.len())
    }

    async fn persist(&self) -> Result<()> {
        let Some(dir) = &self.persist_dir else {
            return Ok(());
        };

        let docs = self.documents.read().await;
        let mut documents: Vec<VectorDocument> = docs.values().cloned().collect();
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        let file = StoreFile {
            dimensions: documents
                .iter()
                .find_map(|doc| doc.embedding.as_ref().map(Vec::len)),
            documents,
        };

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(INDEX_FILE);
        let tmp = dir.join(format!("{}.tmp", INDEX_FILE));
        tokio::fs::write(&tmp, serde_json::to_vec(&file)?).await?;
        tokio::fs::rename(&tmp, &path).await?;

        info!(path = %path.display(), documents = file.documents.len(), "persisted local vector store");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Qdrant vector store over gRPC.
///
/// The collection is created with cosine distance on first write, sized to
/// the first embedding stored. Chunk ids are mapped to deterministic UUIDs
/// so re-indexing the same chunk overwrites its point.
pub struct QdrantVectorStore {
    url: String,
    collection: String,
    client: Option<Qdrant>,
}

impl QdrantVectorStore {
    pub fn new(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            collection: collection.into(),
            client: None,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn map_err(e: qdrant_client::QdrantError) -> Error {
        Error::VectorStore(format!("qdrant: {}", e))
    }

    fn client(&self) -> Result<&Qdrant> {
        self.client
            .as_ref()
            .ok_or_else(|| Error::VectorStore("vector store not connected".to_string()))
    }

    /// Deterministic point id for a chunk id
    fn point_id(chunk_id: &str) -> String {
        Uuid::from_bytes(md5::compute(chunk_id.as_bytes()).0).to_string()
    }

    /// Metadata is stored as a JSON string so arbitrary shapes survive the trip
    fn payload_json(document: &VectorDocument) -> serde_json::Value {
        json!({
            "chunk_id": document.id,
            "content": document.content,
            "metadata": document.metadata.to_string(),
        })
    }

    fn payload(document: &VectorDocument) -> Result<Payload> {
        Payload::try_from(Self::payload_json(document)).map_err(Self::map_err)
    }

    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    async fn collection_exists(&self) -> Result<bool> {
        let collections = self.client()?.list_collections().await.map_err(Self::map_err)?;
        Ok(collections
            .collections
            .iter()
            .any(|c| c.name == self.collection))
    }

    async fn ensure_collection(&self, dimensions: usize) -> Result<()> {
        if self.collection_exists().await? {
            return Ok(());
        }

        self.client()?
            .create_collection(
                CreateCollectionBuilder::new(self.collection.as_str())
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        info!(collection = %self.collection, dimensions, "created qdrant collection");
        Ok(())
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn connect(&mut self) -> Result<()> {
        let client = Qdrant::from_url(&self.url).build().map_err(Self::map_err)?;
        self.client = Some(client);
        Ok(())
    }

    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let Some(dimensions) = documents
            .first()
            .and_then(|doc| doc.embedding.as_ref().map(Vec::len))
        else {
            return Ok(Vec::new());
        };
        self.ensure_collection(dimensions).await?;

        let mut ids = Vec::with_capacity(documents.len());
        let mut points = Vec::with_capacity(documents.len());
        for document in &documents {
            let embedding = document.embedding.clone().ok_or_else(|| {
                Error::VectorStore(format!("document {} has no embedding", document.id))
            })?;
            points.push(PointStruct::new(
                Self::point_id(&document.id),
                embedding,
                Self::payload(document)?,
            ));
            ids.push(document.id.clone());
        }

        self.client()?
            .upsert_points(UpsertPointsBuilder::new(self.collection.as_str(), points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, count = ids.len(), "upserted chunks to qdrant");
        Ok(ids)
    }

    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        if !self.collection_exists().await? {
            return Ok(SearchResult {
                documents: Vec::new(),
                total: 0,
            });
        }

        let mut request =
            SearchPointsBuilder::new(self.collection.as_str(), vector.to_vec(), config.top_k as u64)
                .with_payload(true);
        if let Some(threshold) = config.score_threshold {
            request = request.score_threshold(threshold);
        }

        let response = self
            .client()?
            .search_points(request)
            .await
            .map_err(Self::map_err)?;

        let documents: Vec<VectorDocument> = response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .payload
                    .get("chunk_id")
                    .and_then(Self::extract_string)
                    .unwrap_or_default();
                let content = scored
                    .payload
                    .get("content")
                    .and_then(Self::extract_string)
                    .unwrap_or_default();
                let metadata = scored
                    .payload
                    .get("metadata")
                    .and_then(Self::extract_string)
                    .and_then(|raw| serde_json::from_str(&raw).ok())
                    .unwrap_or_else(|| json!({}));

                VectorDocument {
                    id,
                    content,
                    embedding: None,
                    metadata,
                    score: Some(scored.score),
                }
            })
            .collect();

        let total = documents.len();
        Ok(SearchResult { documents, total })
    }

    async fn clear(&self) -> Result<()> {
        if self.collection_exists().await? {
            self.client()?
                .delete_collection(self.collection.as_str())
                .await
                .map_err(Self::map_err)?;
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        if !self.collection_exists().await? {
            return Ok(0);
        }

        let response = self
            .client()?
            .count(CountPointsBuilder::new(self.collection.as_str()).exact(true))
            .await
            .map_err(Self::map_err)?;
        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }

    fn is_connected(&self) -> bool {
        self.client.is_some()
    }
}
