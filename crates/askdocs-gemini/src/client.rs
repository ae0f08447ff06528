//! Gemini text generation client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use askdocs_core::{
    Error, GenerationConfig, GenerationResult, LLMProvider, Result, with_retry,
};

use crate::config::GeminiConfig;
use crate::http::post_json;

/// Gemini generative model client
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationParams<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "no_stop_sequences")]
    stop_sequences: &'a [String],
}

fn no_stop_sequences(sequences: &&[String]) -> bool {
    sequences.is_empty()
}

impl<'a> GenerationParams<'a> {
    fn from_config(config: &'a GenerationConfig) -> Option<Self> {
        let params = Self {
            max_output_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            stop_sequences: &config.stop_sequences,
        };
        let is_default = params.max_output_tokens.is_none()
            && params.temperature.is_none()
            && params.top_p.is_none()
            && params.top_k.is_none()
            && params.stop_sequences.is_empty();
        if is_default { None } else { Some(params) }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client from configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Perform a single generation request
    async fn perform_generation(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationParams::from_config(config),
        };

        let url = self.config.endpoint(&config.model_id, "generateContent");
        let response: GenerateContentResponse =
            post_json(&self.client, &self.config, &url, &request, Error::LLMProvider).await?;

        extract_generation(response, &config.model_id)
    }
}

/// Collect the visible text of the first candidate
fn extract_generation(response: GenerateContentResponse, model_id: &str) -> Result<GenerationResult> {
    let candidate = response.candidates.into_iter().next();

    let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());
    let text: String = candidate
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .or(finish_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(Error::LLMProvider(format!(
            "Empty response from Gemini API ({})",
            reason
        )));
    }

    Ok(GenerationResult {
        text,
        model_id: model_id.to_string(),
        tokens_used: response.usage_metadata.and_then(|usage| usage.total_token_count),
        finish_reason,
    })
}

#[async_trait]
impl LLMProvider for GeminiClient {
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        debug!(model = %config.model_id, prompt_len = prompt.len(), "generating content");

        let result = with_retry(&self.config.retry, "gemini generateContent", || {
            self.perform_generation(prompt, config)
        })
        .await?;

        debug!(
            model = %result.model_id,
            tokens_used = ?result.tokens_used,
            finish_reason = ?result.finish_reason,
            "generation complete"
        );
        Ok(result)
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<GenerationResult> {
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        extract_generation(response, "gemini-2.5-flash")
    }

    #[test]
    fn test_extracts_text_and_usage() {
        let result = parse(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "You get 20 days "}, {"text": "of leave."}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 12, "totalTokenCount": 30}
            }"#,
        )
        .unwrap();

        assert_eq!(result.text, "You get 20 days of leave.");
        assert_eq!(result.tokens_used, Some(30));
        assert_eq!(result.finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_keeps_model_text_verbatim() {
        let result = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "\n- Step one\n- Step two\n"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(result.text, "\n- Step one\n- Step two\n");
    }

    #[test]
    fn test_whitespace_only_reply_is_an_error() {
        let err = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "  \n"}]}, "finishReason": "MAX_TOKENS"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_skips_thought_parts() {
        let result = parse(
            r#"{"candidates": [{"content": {"parts": [
                {"text": "thinking about leave", "thought": true},
                {"text": "Ask HR."}
            ]}}]}"#,
        )
        .unwrap();

        assert_eq!(result.text, "Ask HR.");
    }

    #[test]
    fn test_blocked_prompt_is_an_error() {
        let err = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap_err();
        match err {
            Error::LLMProvider(message) => assert!(message.contains("SAFETY")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_request_omits_default_generation_config() {
        let config = GenerationConfig::default();
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationParams::from_config(&config),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn test_request_carries_generation_params() {
        let config = GenerationConfig {
            max_tokens: Some(256),
            temperature: Some(0.2),
            ..Default::default()
        };
        let params = GenerationParams::from_config(&config).unwrap();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["maxOutputTokens"], 256);
        assert!(json.get("stopSequences").is_none());
        assert!(json.get("topK").is_none());
    }
}
