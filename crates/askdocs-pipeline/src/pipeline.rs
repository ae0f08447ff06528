//! Pipeline orchestrator

use std::sync::Arc;

use askdocs_core::{
    ConversationRecord, Error, LLMProvider, Message, PipelineState, RAGEngine, Result,
};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info_span};

use crate::{ResponderStage, RetrieverStage, Router, Stage, SynthesizerStage};

/// Knobs for the request pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: None,
        }
    }
}

/// Runs router, retriever, synthesizer and responder in that order.
///
/// Stateless between requests; one instance is shared by the server.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(llm: Arc<dyn LLMProvider>, rag: Arc<dyn RAGEngine>, config: PipelineConfig) -> Self {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(Router::new()),
            Box::new(RetrieverStage::new(rag, config.top_k, config.score_threshold)),
            Box::new(SynthesizerStage::new(llm.clone())),
            Box::new(ResponderStage::new(llm)),
        ];
        Self { stages }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage over the record. Any stage error aborts the request.
    pub async fn invoke(&self, mut record: ConversationRecord) -> Result<ConversationRecord> {
        record.validate_entry()?;
        if record.state != PipelineState::Start {
            return Err(Error::InvalidState(format!(
                "pipeline expects a record in state {}, got {}",
                PipelineState::Start,
                record.state
            )));
        }

        for stage in &self.stages {
            if record.state != stage.entry_state() {
                return Err(Error::InvalidState(format!(
                    "{} expects state {}, got {}",
                    stage.name(),
                    stage.entry_state(),
                    record.state
                )));
            }

            let span = info_span!("stage", name = stage.name());
            stage.run(&mut record).instrument(span).await?;
            record.state = stage.exit_state();
            debug!(stage = stage.name(), state = %record.state, "stage complete");
        }

        Ok(record)
    }

    /// Answer `message` given prior turns
    pub async fn chat(&self, history: Vec<Message>, message: impl Into<String>) -> Result<String> {
        let record = self.invoke(ConversationRecord::new(history, message)).await?;
        record
            .answer()
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidState("pipeline finished without an answer".to_string()))
    }
}
