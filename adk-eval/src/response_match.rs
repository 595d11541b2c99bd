//! LLM-judged final response matching
//!
//! Asks a judge whether the agent's final response is equivalent to the golden
//! response and scores each invocation 1.0 (valid) or 0.0 (anything else).

use adk_core::LlmResponse;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::auto_rater::AutoRater;
use crate::error::{EvalError, Result};
use crate::metric::EvalMetric;
use crate::prompt::{FINAL_RESPONSE_MATCH_V2_PROMPT, PromptTemplate};
use crate::result::{EvaluationResult, PerInvocationResult};
use crate::schema::{Invocation, get_text_from_content};

/// Placeholders every final response match template must use
pub const PROMPT_PLACEHOLDERS: &[&str] =
    &["prompt", "response", "golden_response", "function_api_spec"];

/// Field of the judge's JSON verdict
pub const VERDICT_FIELD: &str = "is_the_agent_response_valid";

/// Tool specifications are not judged by this metric
const NO_FUNCTION_API_SPEC: &str = "None";

static FENCED_JSON_REGEX: OnceLock<Regex> = OnceLock::new();

fn fenced_json_regex() -> &'static Regex {
    FENCED_JSON_REGEX
        .get_or_init(|| Regex::new(r"(?s)```json\n(.*?)\n```").expect("Invalid regex pattern"))
}

/// Auto-rater judging the agent's final response against the golden one
#[derive(Debug, Clone)]
pub struct FinalResponseMatchV2Evaluator {
    eval_metric: EvalMetric,
    prompt_template: PromptTemplate,
    multi_turn: bool,
}

impl FinalResponseMatchV2Evaluator {
    /// Create an evaluator using [`FINAL_RESPONSE_MATCH_V2_PROMPT`]
    pub fn new(eval_metric: EvalMetric) -> Result<Self> {
        Self::with_prompt_template(eval_metric, FINAL_RESPONSE_MATCH_V2_PROMPT)
    }

    /// Create an evaluator with a custom judge prompt.
    ///
    /// The template must use exactly the [`PROMPT_PLACEHOLDERS`].
    pub fn with_prompt_template(eval_metric: EvalMetric, template: &str) -> Result<Self> {
        eval_metric.validate()?;
        let prompt_template = PromptTemplate::new(template, PROMPT_PLACEHOLDERS)?;
        Ok(Self { eval_metric, prompt_template, multi_turn: false })
    }

    /// Mark the evaluator as judging multi-turn conversations.
    ///
    /// Prompts are currently formatted per invocation either way.
    #[must_use]
    pub fn with_multi_turn(mut self, multi_turn: bool) -> Self {
        self.multi_turn = multi_turn;
        self
    }

    pub fn multi_turn(&self) -> bool {
        self.multi_turn
    }
}

impl AutoRater for FinalResponseMatchV2Evaluator {
    fn eval_metric(&self) -> &EvalMetric {
        &self.eval_metric
    }

    fn prompt_template(&self) -> &PromptTemplate {
        &self.prompt_template
    }

    fn format_auto_rater_prompt(
        &self,
        actual_invocation: &Invocation,
        expected_invocation: &Invocation,
    ) -> Result<String> {
        let golden_response = expected_invocation.response_text();
        let response = actual_invocation.response_text();
        let user_prompt = expected_invocation.user_text();

        self.prompt_template.render(&[
            ("function_api_spec", NO_FUNCTION_API_SPEC),
            ("prompt", &user_prompt),
            ("response", &response),
            ("golden_response", &golden_response),
        ])
    }

    fn convert_auto_rater_response_to_score(&self, response: &LlmResponse) -> Result<f64> {
        let text = get_text_from_content(response.content.as_ref());
        let verdict =
            parse_verdict(text.trim()).map_err(|reason| EvalError::judge_output(&text, reason))?;
        Ok(if verdict.eq_ignore_ascii_case("valid") { 1.0 } else { 0.0 })
    }

    /// Fraction of invocations the judge found valid
    fn aggregate_invocation_results(
        &self,
        results: Vec<PerInvocationResult>,
    ) -> Result<EvaluationResult> {
        if results.is_empty() {
            return Err(EvalError::EmptyResultSet);
        }
        let num_valid = results.iter().filter(|r| r.score == 1.0).count();
        let overall_score = num_valid as f64 / results.len() as f64;
        EvaluationResult::new(overall_score, self.eval_metric.threshold, results)
    }
}

/// Extract the verdict string from the judge's answer.
///
/// A fenced ```` ```json ```` block is preferred; otherwise the whole text must be JSON.
fn parse_verdict(text: &str) -> std::result::Result<String, String> {
    let json_text = fenced_json_regex()
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str());

    let parsed: Value =
        serde_json::from_str(json_text).map_err(|e| format!("invalid JSON: {}", e))?;
    match parsed.get(VERDICT_FIELD) {
        Some(Value::String(verdict)) => Ok(verdict.clone()),
        Some(other) => Err(format!("'{}' is not a string: {}", VERDICT_FIELD, other)),
        None => Err(format!("missing field '{}'", VERDICT_FIELD)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adk_core::Content;

    fn evaluator(threshold: f64) -> FinalResponseMatchV2Evaluator {
        FinalResponseMatchV2Evaluator::new(EvalMetric::final_response_match_v2(threshold).unwrap())
            .unwrap()
    }

    fn score(text: &str) -> Result<f64> {
        evaluator(0.5).convert_auto_rater_response_to_score(&LlmResponse::text(text))
    }

    fn result_with_score(score: f64) -> PerInvocationResult {
        let inv = Invocation::from_text("inv", "question", "answer");
        PerInvocationResult::new(inv.clone(), inv, score, 0.5)
    }

    #[test]
    fn test_fenced_verdict_is_case_insensitive() {
        let text = "```json\n{\"is_the_agent_response_valid\": \"VALID\"}\n```";
        assert_eq!(score(text).unwrap(), 1.0);
    }

    #[test]
    fn test_bare_json_verdict() {
        assert_eq!(score("{\"is_the_agent_response_valid\": \"invalid\"}").unwrap(), 0.0);
        assert_eq!(score("  {\"is_the_agent_response_valid\": \"Valid\"}\n").unwrap(), 1.0);
        assert_eq!(score("{\"is_the_agent_response_valid\": \"partially\"}").unwrap(), 0.0);
    }

    #[test]
    fn test_fenced_block_surrounded_by_prose() {
        let text = "The agent answered correctly.\n```json\n{\n  \"reasoning\": \"same facts\",\n  \"is_the_agent_response_valid\": \"valid\"\n}\n```\nDone.";
        assert_eq!(score(text).unwrap(), 1.0);
    }

    #[test]
    fn test_first_fenced_block_wins() {
        let text = "```json\n{\"is_the_agent_response_valid\": \"invalid\"}\n```\n```json\n{\"is_the_agent_response_valid\": \"valid\"}\n```";
        assert_eq!(score(text).unwrap(), 0.0);
    }

    #[test]
    fn test_not_json_carries_raw_text() {
        let err = score("not json at all").unwrap_err();
        match &err {
            EvalError::JudgeOutputParse { raw, reason } => {
                assert_eq!(raw, "not json at all");
                assert!(reason.contains("invalid JSON"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.raw_judge_output(), Some("not json at all"));
    }

    #[test]
    fn test_malformed_fenced_block_is_an_error() {
        let err = score("```json\n{\"is_the_agent_response_valid\": \n```").unwrap_err();
        assert!(matches!(err, EvalError::JudgeOutputParse { .. }));
    }

    #[test]
    fn test_missing_or_non_string_verdict_is_an_error() {
        let err = score("{\"verdict\": \"valid\"}").unwrap_err();
        assert!(matches!(
            &err,
            EvalError::JudgeOutputParse { reason, .. } if reason.contains("missing field")
        ));

        let err = score("{\"is_the_agent_response_valid\": true}").unwrap_err();
        assert!(matches!(err, EvalError::JudgeOutputParse { .. }));

        let err = score("[\"valid\"]").unwrap_err();
        assert!(matches!(err, EvalError::JudgeOutputParse { .. }));
    }

    #[test]
    fn test_fenced_verdict_split_across_parts() {
        let answer = LlmResponse::new(
            Content::new("model")
                .with_text("```json\n{\"is_the_agent_response_valid\": \"valid\"}")
                .with_text("```"),
        );
        assert_eq!(evaluator(0.5).convert_auto_rater_response_to_score(&answer).unwrap(), 1.0);
    }

    #[test]
    fn test_empty_answer_is_an_error() {
        let empty = LlmResponse::default();
        let err = evaluator(0.5).convert_auto_rater_response_to_score(&empty).unwrap_err();
        assert!(matches!(err, EvalError::JudgeOutputParse { raw, .. } if raw.is_empty()));
    }

    #[test]
    fn test_prompt_uses_expected_prompt_and_both_responses() {
        let expected = Invocation::from_text("inv_1", "What is 2+2?", "4");
        let actual = Invocation::new("inv_1", Content::new("user").with_text("ignored user text"))
            .with_final_response(
                Content::new("model").with_text("The answer").with_text("is 4."),
            );

        let prompt = evaluator(0.5).format_auto_rater_prompt(&actual, &expected).unwrap();
        assert!(prompt.contains("User prompt:\nWhat is 2+2?\n"));
        assert!(prompt.contains("Agent response:\nThe answer\nis 4.\n"));
        assert!(prompt.contains("Reference response:\n4\n"));
        assert!(prompt.contains("tools:\nNone\n"));
        assert!(!prompt.contains("ignored user text"));
    }

    #[test]
    fn test_prompt_formatting_is_idempotent() {
        let rater = evaluator(0.5).with_multi_turn(true);
        let expected = Invocation::from_text("inv_1", "Capital of France?", "Paris");
        let actual = Invocation::from_text("inv_1", "Capital of France?", "It is Paris.");

        let first = rater.format_auto_rater_prompt(&actual, &expected).unwrap();
        let second = rater.format_auto_rater_prompt(&actual, &expected).unwrap();
        assert_eq!(first, second);
        assert!(rater.multi_turn());
    }

    #[test]
    fn test_missing_final_response_renders_empty() {
        let expected = Invocation::from_text("inv_1", "Hi", "Hello!");
        let actual = Invocation::new("inv_1", Content::new("user").with_text("Hi"));
        let prompt = evaluator(0.5).format_auto_rater_prompt(&actual, &expected).unwrap();
        assert!(prompt.contains("Agent response:\n\n"));
    }

    #[test]
    fn test_custom_template_must_have_all_placeholders() {
        let metric = EvalMetric::final_response_match_v2(0.5).unwrap();
        let err = FinalResponseMatchV2Evaluator::with_prompt_template(
            metric.clone(),
            "Is {response} the same as {golden_response}?",
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::ConfigError(_)));

        let rater = FinalResponseMatchV2Evaluator::with_prompt_template(
            metric,
            "{function_api_spec}|{prompt}|{response}|{golden_response}",
        )
        .unwrap();
        let inv = Invocation::from_text("inv", "q", "a");
        assert_eq!(rater.format_auto_rater_prompt(&inv, &inv).unwrap(), "None|q|a|a");
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let metric = EvalMetric {
            metric_name: "final_response_match_v2".into(),
            threshold: -0.1,
            judge_model_options: None,
        };
        assert!(matches!(
            FinalResponseMatchV2Evaluator::new(metric),
            Err(EvalError::ConfigError(_))
        ));
    }

    #[test]
    fn test_aggregate_three_of_four_passes_at_boundary() {
        let results = vec![
            result_with_score(1.0),
            result_with_score(1.0),
            result_with_score(0.0),
            result_with_score(1.0),
        ];

        let passing = evaluator(0.75).aggregate_invocation_results(results.clone()).unwrap();
        assert_eq!(passing.overall_score, 0.75);
        assert!(passing.passed());
        assert_eq!(passing.per_invocation_results.len(), 4);

        let failing = evaluator(0.8).aggregate_invocation_results(results).unwrap();
        assert_eq!(failing.overall_score, 0.75);
        assert!(!failing.passed());
    }

    #[test]
    fn test_aggregate_empty_fails() {
        let err = evaluator(0.5).aggregate_invocation_results(vec![]).unwrap_err();
        assert!(matches!(err, EvalError::EmptyResultSet));
    }

    #[test]
    fn test_per_invocation_status_follows_threshold() {
        let rater = evaluator(0.5);
        let eval = rater
            .aggregate_invocation_results(vec![result_with_score(1.0), result_with_score(0.0)])
            .unwrap();
        assert_eq!(eval.failures().count(), 1);
        assert_eq!(eval.overall_score, 0.5);
    }
}
