//! Gemini embedding client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use askdocs_core::{EmbeddingProvider, Error, Result, TaskType, with_retry};

use crate::config::GeminiConfig;
use crate::http::post_json;

/// Largest batch accepted by `batchEmbedContents`
const MAX_BATCH_SIZE: usize = 100;

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// Documents are embedded with `RETRIEVAL_DOCUMENT` through
/// `batchEmbedContents`; queries with `RETRIEVAL_QUERY` through
/// `embedContent`.
pub struct GeminiEmbeddings {
    config: GeminiConfig,
    client: Client,
    dimensions: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: EmbedContent<'a>,
    task_type: TaskType,
}

#[derive(Serialize)]
struct EmbedContent<'a> {
    parts: [EmbedPart<'a>; 1],
}

#[derive(Serialize)]
struct EmbedPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

impl GeminiEmbeddings {
    /// Output size of `text-embedding-004`
    pub const DEFAULT_DIMENSIONS: usize = 768;

    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            dimensions: Self::DEFAULT_DIMENSIONS,
        })
    }

    /// Override the expected dimensionality for non-default models
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    fn request<'a>(&self, text: &'a str, task_type: TaskType) -> EmbedContentRequest<'a> {
        EmbedContentRequest {
            model: format!("models/{}", self.config.embedding_model),
            content: EmbedContent {
                parts: [EmbedPart { text }],
            },
            task_type,
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| self.request(text, TaskType::RetrievalDocument))
                .collect(),
        };
        let url = self
            .config
            .endpoint(&self.config.embedding_model, "batchEmbedContents");

        let response: BatchEmbedResponse =
            post_json(&self.client, &self.config, &url, &body, Error::Embedding).await?;

        if response.embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, Gemini returned {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(MAX_BATCH_SIZE) {
            debug!(batch_size = batch.len(), "embedding document batch");
            let embedded = with_retry(&self.config.retry, "gemini batchEmbedContents", || {
                self.embed_batch(batch)
            })
            .await?;
            vectors.extend(embedded);
        }

        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        debug!(text_len = text.len(), "embedding query");

        let body = self.request(text, TaskType::RetrievalQuery);
        let url = self.config.endpoint(&self.config.embedding_model, "embedContent");

        let response: EmbedContentResponse = with_retry(&self.config.retry, "gemini embedContent", || {
            post_json(&self.client, &self.config, &url, &body, Error::Embedding)
        })
        .await?;

        Ok(response.embedding.values)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
