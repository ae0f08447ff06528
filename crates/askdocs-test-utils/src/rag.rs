use std::sync::Mutex;

use askdocs_core::{Error, RAGEngine, RAGQuery, RAGResult, Result, VectorDocument};
use async_trait::async_trait;
use serde_json::json;

/// Returns a fixed list of chunks, best first, and records every query
#[derive(Debug, Default)]
pub struct StaticRAGEngine {
    chunks: Vec<String>,
    queries: Mutex<Vec<RAGQuery>>,
    unreachable: bool,
}

impl StaticRAGEngine {
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// An engine whose backing store cannot be reached
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<RAGQuery> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl RAGEngine for StaticRAGEngine {
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult> {
        self.queries.lock().expect("queries lock").push(query.clone());

        if self.unreachable {
            return Err(Error::VectorStore("connection refused".to_string()));
        }

        let documents: Vec<VectorDocument> = self
            .chunks
            .iter()
            .take(query.top_k)
            .enumerate()
            .map(|(rank, content)| VectorDocument {
                id: format!("chunk_{}", rank),
                content: content.clone(),
                embedding: None,
                metadata: json!({"source": "static"}),
                score: Some(1.0 - rank as f32 * 0.1),
            })
            .collect();

        let context = self.build_context(&documents);
        Ok(RAGResult { documents, context })
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        Ok(json!({"ready": !self.unreachable, "chunks": self.chunks.len()}))
    }

    fn is_ready(&self) -> bool {
        !self.unreachable
    }
}
