use std::sync::Arc;

use askdocs_core::{ConversationRecord, LLMProvider, PipelineState, Result};
use async_trait::async_trait;

use crate::Stage;

const SUMMARY_INSTRUCTION: &str = "Summarize the following context clearly and concisely:";

/// Condenses the retrieved context with one model call
pub struct SynthesizerStage {
    llm: Arc<dyn LLMProvider>,
}

impl SynthesizerStage {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }

    pub fn build_prompt(context: &str) -> String {
        format!("{}\n\n{}", SUMMARY_INSTRUCTION, context)
    }
}

#[async_trait]
impl Stage for SynthesizerStage {
    fn name(&self) -> &'static str {
        "synthesizer"
    }

    fn entry_state(&self) -> PipelineState {
        PipelineState::Retrieved
    }

    fn exit_state(&self) -> PipelineState {
        PipelineState::Synthesized
    }

    async fn run(&self, record: &mut ConversationRecord) -> Result<()> {
        let prompt = Self::build_prompt(record.context_text());
        let summary = self.llm.generate(&prompt).await?;
        record.context = Some(summary.text);
        Ok(())
    }
}
