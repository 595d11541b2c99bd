//! Auto-rater contract and the loop that drives it
//!
//! An auto-rater scores an agent by asking a judge model about every invocation
//! of a trace. Concrete raters decide how the judge is prompted, how its answer
//! becomes a score and how scores are combined; [`evaluate_with_auto_rater`]
//! owns everything in between and is the same for every rater.

use adk_core::LlmResponse;
use adk_telemetry::Instrument;
use futures::{StreamExt, TryStreamExt, stream};

use crate::error::{EvalError, Result};
use crate::evaluator::EvaluationOptions;
use crate::llm_judge::LlmJudge;
use crate::metric::EvalMetric;
use crate::prompt::PromptTemplate;
use crate::result::{EvaluationResult, PerInvocationResult};
use crate::schema::{Invocation, get_text_from_content};

/// An evaluator that delegates the verdict on each invocation to a judge model
pub trait AutoRater: Send + Sync {
    /// Metric being computed, including its pass threshold
    fn eval_metric(&self) -> &EvalMetric;

    /// Template the judge prompt is rendered from
    fn prompt_template(&self) -> &PromptTemplate;

    /// Build the judge prompt for one invocation pair.
    ///
    /// Must be deterministic: the same pair always yields the same prompt.
    fn format_auto_rater_prompt(
        &self,
        actual_invocation: &Invocation,
        expected_invocation: &Invocation,
    ) -> Result<String>;

    /// Turn the judge's answer into a finite score.
    ///
    /// Fails with [`EvalError::JudgeOutputParse`] when the answer is unusable.
    fn convert_auto_rater_response_to_score(&self, response: &LlmResponse) -> Result<f64>;

    /// Combine the results of every invocation of a trace.
    ///
    /// Fails with [`EvalError::EmptyResultSet`] when `results` is empty.
    fn aggregate_invocation_results(
        &self,
        results: Vec<PerInvocationResult>,
    ) -> Result<EvaluationResult>;
}

/// Score a trace with `rater`, asking `judge` once per invocation.
///
/// Every prompt is formatted before the first judge call, so template problems
/// surface without spending any model calls. Judge calls then run with at most
/// `options.concurrency` in flight; results keep trace order. The first failure
/// aborts the run and drops the calls still in flight. Failures are tagged with
/// the index of the offending invocation.
pub async fn evaluate_with_auto_rater<R>(
    rater: &R,
    judge: &LlmJudge,
    actual_invocations: &[Invocation],
    expected_invocations: &[Invocation],
    options: &EvaluationOptions,
) -> Result<EvaluationResult>
where
    R: AutoRater + ?Sized,
{
    if actual_invocations.len() != expected_invocations.len() {
        return Err(EvalError::ConfigError(format!(
            "trace has {} actual invocation(s) but {} expected",
            actual_invocations.len(),
            expected_invocations.len()
        )));
    }

    let metric = rater.eval_metric();
    let span = adk_telemetry::eval_run_span(&metric.metric_name, actual_invocations.len());

    async move {
        let prompts = actual_invocations
            .iter()
            .zip(expected_invocations)
            .enumerate()
            .map(|(index, (actual, expected))| {
                rater
                    .format_auto_rater_prompt(actual, expected)
                    .map_err(|e| e.at_invocation(index))
            })
            .collect::<Result<Vec<String>>>()?;

        // Items carry owned prompts only; invocations are looked up by index.
        let results: Vec<PerInvocationResult> = stream::iter(prompts.into_iter().enumerate())
            .map(move |(index, prompt)| {
                let actual = &actual_invocations[index];
                let expected = &expected_invocations[index];
                let span = adk_telemetry::invocation_eval_span(index, &expected.invocation_id);
                async move {
                    let result =
                        score_invocation(rater, judge, actual, expected, &prompt, metric.threshold)
                            .await
                            .map_err(|e| e.at_invocation(index))?;
                    tracing::Span::current().record("eval.score", result.score);
                    Ok::<_, EvalError>(result)
                }
                .instrument(span)
            })
            .buffered(options.concurrency())
            .try_collect()
            .await?;

        let evaluation = rater.aggregate_invocation_results(results)?;
        adk_telemetry::record_overall_score(evaluation.overall_score);
        tracing::info!(
            metric = %metric.metric_name,
            overall_score = evaluation.overall_score,
            status = %evaluation.overall_eval_status,
            "evaluation completed"
        );
        Ok::<_, EvalError>(evaluation)
    }
    .instrument(span)
    .await
}

async fn score_invocation<R>(
    rater: &R,
    judge: &LlmJudge,
    actual: &Invocation,
    expected: &Invocation,
    prompt: &str,
    threshold: f64,
) -> Result<PerInvocationResult>
where
    R: AutoRater + ?Sized,
{
    let answer = judge.judge(prompt).await?;
    let score = match rater.convert_auto_rater_response_to_score(&answer) {
        Ok(score) if score.is_finite() => score,
        Ok(score) => {
            return Err(EvalError::JudgeOutputParse {
                raw: get_text_from_content(answer.content.as_ref()),
                reason: format!("score {} is not finite", score),
            });
        }
        Err(e) => {
            tracing::warn!(error = %e, "judge answer could not be scored");
            return Err(e);
        }
    };
    tracing::debug!(score, "invocation scored");
    Ok(PerInvocationResult::new(actual.clone(), expected.clone(), score, threshold))
}
