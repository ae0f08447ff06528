use std::sync::Arc;

use askdocs_core::{ConversationRecord, PipelineState, RAGEngine, RAGQuery, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::Stage;

/// Replaces the context with the top-k chunks for the newest message.
///
/// The route label left by the router is not used to filter the search.
pub struct RetrieverStage {
    engine: Arc<dyn RAGEngine>,
    top_k: usize,
    score_threshold: Option<f32>,
}

impl RetrieverStage {
    pub fn new(engine: Arc<dyn RAGEngine>, top_k: usize, score_threshold: Option<f32>) -> Self {
        Self {
            engine,
            top_k,
            score_threshold,
        }
    }
}

#[async_trait]
impl Stage for RetrieverStage {
    fn name(&self) -> &'static str {
        "retriever"
    }

    fn entry_state(&self) -> PipelineState {
        PipelineState::Routed
    }

    fn exit_state(&self) -> PipelineState {
        PipelineState::Retrieved
    }

    async fn run(&self, record: &mut ConversationRecord) -> Result<()> {
        let query = RAGQuery {
            query: record.latest()?.content().to_string(),
            top_k: self.top_k,
            score_threshold: self.score_threshold,
        };

        let result = self.engine.retrieve(&query).await?;
        debug!(
            route = record.context_text(),
            chunks = result.documents.len(),
            "retrieved context"
        );

        record.context = Some(result.context);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdocs_core::Error;
    use askdocs_test_utils::StaticRAGEngine;

    fn routed(message: &str) -> ConversationRecord {
        let mut record = ConversationRecord::new(Vec::new(), message);
        record.context = Some("hr".to_string());
        record.state = PipelineState::Routed;
        record
    }

    #[tokio::test]
    async fn test_uses_raw_message_and_top_k() {
        let engine = Arc::new(StaticRAGEngine::new(["one", "two", "three", "four", "five"]));
        let stage = RetrieverStage::new(engine.clone(), 4, None);

        let mut record = routed("Can I take remote leave next week?");
        stage.run(&mut record).await.unwrap();

        let queries = engine.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].query, "Can I take remote leave next week?");
        assert_eq!(queries[0].top_k, 4);
        assert_eq!(record.context.as_deref(), Some("one\n\ntwo\n\nthree\n\nfour"));
    }

    #[tokio::test]
    async fn test_empty_index_gives_empty_context() {
        let stage = RetrieverStage::new(Arc::new(StaticRAGEngine::empty()), 4, None);

        let mut record = routed("anything");
        stage.run(&mut record).await.unwrap();

        assert_eq!(record.context.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_unreachable_store_propagates() {
        let stage = RetrieverStage::new(Arc::new(StaticRAGEngine::unreachable()), 4, None);

        let mut record = routed("anything");
        let err = stage.run(&mut record).await.unwrap_err();

        assert!(matches!(err, Error::VectorStore(_)));
        assert_eq!(record.context.as_deref(), Some("hr"));
    }
}
