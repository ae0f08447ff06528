//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Configuration for text generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "gemini-2.5-flash".to_string(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            top_k: None,
            stop_sequences: Vec::new(),
        }
    }
}

impl GenerationConfig {
    /// Default configuration targeting a specific model
    pub fn for_model(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Default::default()
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
    pub finish_reason: Option<String>,
}

/// Trait for hosted generative models: prompt in, text out.
///
/// Implementations own their transport, timeout and retry behaviour, and
/// are shared process-wide behind an `Arc`.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate text with the provider's default configuration
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = GenerationConfig::for_model(self.model_id());
        self.generate_with_config(prompt, &config).await
    }

    /// Generate text with custom configuration
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult>;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
