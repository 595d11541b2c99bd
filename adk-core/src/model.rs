use crate::{Result, types::Content};
use async_trait::async_trait;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

pub type LlmResponseStream = Pin<Box<dyn Stream<Item = Result<LlmResponse>> + Send>>;

/// A language model that can be asked to generate content.
///
/// Implementations own transport, authentication and retry policy. Callers
/// hand over a fully formed request and consume the returned stream.
#[async_trait]
pub trait Llm: Send + Sync {
    fn name(&self) -> &str;
    async fn generate_content(&self, req: LlmRequest, stream: bool) -> Result<LlmResponseStream>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub model: String,
    pub contents: Vec<Content>,
    pub config: Option<GenerateContentConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentConfig {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<i32>,
    pub max_output_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: Option<Content>,
    pub usage_metadata: Option<UsageMetadata>,
    pub finish_reason: Option<FinishReason>,
    pub partial: bool,
    pub turn_complete: bool,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub prompt_token_count: i32,
    pub candidates_token_count: i32,
    pub total_token_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Other,
}

impl LlmRequest {
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self { model: model.into(), contents, config: None }
    }

    /// Set the generation config.
    pub fn with_config(mut self, config: GenerateContentConfig) -> Self {
        self.config = Some(config);
        self
    }
}

impl LlmResponse {
    pub fn new(content: Content) -> Self {
        Self {
            content: Some(content),
            usage_metadata: None,
            finish_reason: Some(FinishReason::Stop),
            partial: false,
            turn_complete: true,
            error_code: None,
            error_message: None,
        }
    }

    /// Convenience constructor for a complete model answer made of one text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Content::new("model").with_text(text))
    }

    /// Concatenation of every text part of the response content.
    pub fn text_content(&self) -> String {
        self.content.as_ref().map(|c| c.texts().collect::<String>()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_request_creation() {
        let req = LlmRequest::new("judge-model", vec![Content::new("user").with_text("hi")]);
        assert_eq!(req.model, "judge-model");
        assert_eq!(req.contents.len(), 1);
        assert!(req.config.is_none());
    }

    #[test]
    fn test_llm_request_with_config() {
        let config = GenerateContentConfig {
            temperature: Some(0.0),
            max_output_tokens: Some(256),
            ..Default::default()
        };
        let req = LlmRequest::new("judge-model", vec![]).with_config(config.clone());
        assert_eq!(req.config, Some(config));
    }

    #[test]
    fn test_llm_response_text() {
        let resp = LlmResponse::text("verdict");
        assert!(resp.turn_complete);
        assert!(!resp.partial);
        assert_eq!(resp.finish_reason, Some(FinishReason::Stop));
        assert_eq!(resp.text_content(), "verdict");
        assert_eq!(LlmResponse::default().text_content(), "");
    }

    #[test]
    fn test_llm_response_deserialize() {
        let json = serde_json::json!({
            "content": {
                "role": "model",
                "parts": [{"text": "hello "}, {"text": "world"}]
            },
            "partial": false,
            "turn_complete": true
        });

        let response: LlmResponse = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(response.text_content(), "hello world");
    }
}
