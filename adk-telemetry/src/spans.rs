//! Span helpers for evaluation runs
//!
//! Provides pre-configured spans for instrumenting evaluation runs, per-invocation
//! scoring and judge model calls.

use tracing::Span;

/// Create a span covering one metric evaluated over a whole trace
///
/// # Example
/// ```
/// use adk_telemetry::eval_run_span;
/// let span = eval_run_span("final_response_match_v2", 4);
/// let _enter = span.enter();
/// // Evaluation code here
/// ```
pub fn eval_run_span(metric_name: &str, invocation_count: usize) -> Span {
    tracing::info_span!(
        "eval.run",
        eval.metric = metric_name,
        eval.invocations = invocation_count,
        eval.overall_score = tracing::field::Empty,
    )
}

/// Create a span for scoring a single invocation pair
///
/// # Arguments
/// * `index` - Position of the invocation within the trace
/// * `invocation_id` - Identifier of the expected invocation
pub fn invocation_eval_span(index: usize, invocation_id: &str) -> Span {
    tracing::debug_span!(
        "eval.invocation",
        invocation.index = index,
        invocation.id = invocation_id,
        eval.score = tracing::field::Empty,
    )
}

/// Create a span for a judge model call
///
/// # Example
/// ```
/// use adk_telemetry::judge_call_span;
/// let span = judge_call_span("gemini-2.5-flash");
/// let _enter = span.enter();
/// // Model call code here
/// ```
pub fn judge_call_span(model_name: &str) -> Span {
    tracing::info_span!("judge.call", model.name = model_name, otel.kind = "client")
}

/// Record the overall score on the current `eval.run` span
pub fn record_overall_score(score: f64) {
    Span::current().record("eval.overall_score", score);
}
