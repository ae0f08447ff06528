//! RAG (Retrieval-Augmented Generation) engine trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, VectorDocument};

/// Separator placed between retrieved chunks when building context
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Query for RAG retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RAGQuery {
    pub query: String,
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl RAGQuery {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            score_threshold: None,
        }
    }
}

impl Default for RAGQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            top_k: 4,
            score_threshold: None,
        }
    }
}

/// Result from RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGResult {
    pub documents: Vec<VectorDocument>,
    pub context: String,
}

/// Trait for RAG engines: query text and k in, ordered chunks out.
#[async_trait]
pub trait RAGEngine: Send + Sync {
    /// Retrieve the most similar chunks for a query
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult>;

    /// Concatenate chunk texts in rank order, blank-line separated
    fn build_context(&self, documents: &[VectorDocument]) -> String {
        documents
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Get statistics about the RAG engine
    async fn stats(&self) -> Result<serde_json::Value>;

    /// Check if the RAG engine is ready
    fn is_ready(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NullEngine;

    #[async_trait]
    impl RAGEngine for NullEngine {
        async fn retrieve(&self, _query: &RAGQuery) -> Result<RAGResult> {
            Ok(RAGResult {
                documents: Vec::new(),
                context: String::new(),
            })
        }

        async fn stats(&self) -> Result<serde_json::Value> {
            Ok(json!({}))
        }

        fn is_ready(&self) -> bool {
            true
        }
    }

    fn doc(id: &str, content: &str) -> VectorDocument {
        VectorDocument {
            id: id.to_string(),
            content: content.to_string(),
            embedding: None,
            metadata: json!({}),
            score: None,
        }
    }

    #[test]
    fn test_build_context_joins_with_blank_line() {
        let docs = vec![
            doc("1", "Employees get 20 days of annual leave."),
            doc("2", "Remote work requires manager approval."),
        ];

        assert_eq!(
            NullEngine.build_context(&docs),
            "Employees get 20 days of annual leave.\n\nRemote work requires manager approval."
        );
    }

    #[test]
    fn test_build_context_empty() {
        assert_eq!(NullEngine.build_context(&[]), "");
    }

    #[test]
    fn test_query_defaults() {
        let query = RAGQuery::new("holiday policy", 4);
        assert_eq!(query.top_k, 4);
        assert_eq!(query.score_threshold, None);
        assert_eq!(RAGQuery::default().top_k, 4);
    }
}
