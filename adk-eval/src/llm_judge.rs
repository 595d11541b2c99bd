//! Judge model invocation
//!
//! Sends one formatted prompt to a model and returns its whole answer. Retries,
//! quotas and transport belong to the [`Llm`] implementation.

use crate::error::{EvalError, Result};
use crate::metric::JudgeModelOptions;
use crate::schema::get_text_from_content;
use adk_core::{Content, GenerateContentConfig, Llm, LlmRequest, LlmResponse};
use adk_telemetry::Instrument;
use futures::StreamExt;
use std::sync::Arc;

/// LLM-based judge
#[derive(Clone)]
pub struct LlmJudge {
    model: Arc<dyn Llm>,
    options: JudgeModelOptions,
}

impl std::fmt::Debug for LlmJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmJudge")
            .field("model", &self.model.name())
            .field("options", &self.options)
            .finish()
    }
}

impl LlmJudge {
    /// Create a new LLM judge with the given model
    pub fn new(model: Arc<dyn Llm>) -> Self {
        let options = JudgeModelOptions::default().with_judge_model(model.name());
        Self { model, options }
    }

    /// Create with explicit options
    pub fn with_options(model: Arc<dyn Llm>, options: JudgeModelOptions) -> Self {
        Self { model, options }
    }

    pub fn options(&self) -> &JudgeModelOptions {
        &self.options
    }

    fn build_request(&self, prompt: &str) -> LlmRequest {
        LlmRequest::new(
            self.options.judge_model.clone(),
            vec![Content::new("user").with_text(prompt)],
        )
        .with_config(GenerateContentConfig {
            temperature: Some(self.options.temperature),
            max_output_tokens: Some(self.options.max_output_tokens),
            ..Default::default()
        })
    }

    /// Ask the judge once and return its answer.
    ///
    /// Streamed chunks are merged into a single response whose content holds the
    /// concatenated text. Text parts within one chunk are joined with newlines. Dropping the returned future cancels the call.
    pub async fn judge(&self, prompt: &str) -> Result<LlmResponse> {
        let span = adk_telemetry::judge_call_span(&self.options.judge_model);
        let call = self.collect_answer(prompt).instrument(span);

        match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| EvalError::JudgeTimeout(limit))?,
            None => call.await,
        }
    }

    async fn collect_answer(&self, prompt: &str) -> Result<LlmResponse> {
        let request = self.build_request(prompt);
        let mut stream = self.model.generate_content(request, false).await?;

        let mut text = String::new();
        let mut last: Option<LlmResponse> = None;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            // Parts of one chunk are lines; successive chunks continue the text.
            text.push_str(&get_text_from_content(chunk.content.as_ref()));
            last = Some(chunk);
        }

        let text_len = text.len();
        let mut answer = last.unwrap_or_default();
        answer.content = Some(Content::new("model").with_text(text));
        answer.partial = false;
        tracing::debug!(answer_len = text_len, "judge answered");
        Ok(answer)
    }
}
