use std::collections::VecDeque;
use std::sync::Mutex;

use askdocs_core::{Error, GenerationConfig, GenerationResult, LLMProvider, Result};
use async_trait::async_trait;

fn result(text: impl Into<String>, config: &GenerationConfig) -> GenerationResult {
    GenerationResult {
        text: text.into(),
        model_id: config.model_id.clone(),
        tokens_used: None,
        finish_reason: Some("STOP".to_string()),
    }
}

/// Always answers with the same text
#[derive(Debug, Clone)]
pub struct FixedLLM {
    response: String,
}

impl FixedLLM {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl LLMProvider for FixedLLM {
    async fn generate_with_config(
        &self,
        _prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        Ok(result(self.response.clone(), config))
    }

    fn model_id(&self) -> &str {
        "fixed-llm"
    }
}

/// Records every prompt and replays scripted responses in order.
///
/// Once the script runs out it answers `response #<n>`.
#[derive(Debug, Default)]
pub struct RecordingLLM {
    prompts: Mutex<Vec<String>>,
    script: Mutex<VecDeque<String>>,
}

impl RecordingLLM {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompts: Mutex::new(Vec::new()),
            script: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().expect("prompts lock").last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().expect("prompts lock").len()
    }
}

#[async_trait]
impl LLMProvider for RecordingLLM {
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let call = {
            let mut prompts = self.prompts.lock().expect("prompts lock");
            prompts.push(prompt.to_string());
            prompts.len()
        };
        let text = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| format!("response #{}", call));
        Ok(result(text, config))
    }

    fn model_id(&self) -> &str {
        "recording-llm"
    }
}

/// Fails every call, the way an unreachable model endpoint would
#[derive(Debug, Clone)]
pub struct FailingLLM {
    message: String,
}

impl FailingLLM {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl LLMProvider for FailingLLM {
    async fn generate_with_config(
        &self,
        _prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        Err(Error::LLMProvider(self.message.clone()))
    }

    fn model_id(&self) -> &str {
        "failing-llm"
    }
}
