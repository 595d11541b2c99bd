//! Evaluator abstraction
//!
//! [`Evaluator`] is what callers hold: something that turns a pair of traces
//! into an [`EvaluationResult`]. [`AutoRaterEvaluator`] adapts any
//! [`AutoRater`] plus a judge model into one.

use adk_core::Llm;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auto_rater::{AutoRater, evaluate_with_auto_rater};
use crate::error::Result;
use crate::llm_judge::LlmJudge;
use crate::result::EvaluationResult;
use crate::schema::{EvalCase, Invocation};

/// Execution options shared by all evaluators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationOptions {
    /// Maximum number of judge calls in flight for one trace
    #[serde(default = "default_concurrency")]
    concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self { concurrency: default_concurrency() }
    }
}

impl EvaluationOptions {
    /// Set the judge concurrency. Zero is treated as one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Judge one invocation at a time
    #[must_use]
    pub fn sequential() -> Self {
        Self::default().with_concurrency(1)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

/// Scores an agent's trace against a golden trace
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Name of the metric this evaluator computes
    fn metric_name(&self) -> &str;

    /// Evaluate paired invocations. Both slices must have the same length.
    async fn evaluate_invocations(
        &self,
        actual_invocations: &[Invocation],
        expected_invocations: &[Invocation],
    ) -> Result<EvaluationResult>;

    /// Evaluate an agent's invocations against a golden eval case
    async fn evaluate_case(
        &self,
        eval_case: &EvalCase,
        actual_invocations: &[Invocation],
    ) -> Result<EvaluationResult> {
        tracing::debug!(eval_id = %eval_case.eval_id, metric = self.metric_name(), "evaluating case");
        self.evaluate_invocations(actual_invocations, &eval_case.conversation).await
    }
}

/// Binds an [`AutoRater`] to the judge model it consults
pub struct AutoRaterEvaluator<R> {
    rater: R,
    judge: LlmJudge,
    options: EvaluationOptions,
}

impl<R: AutoRater> AutoRaterEvaluator<R> {
    /// Use `judge_model` as the judge, configured from the metric's judge options
    pub fn new(rater: R, judge_model: Arc<dyn Llm>) -> Self {
        let judge = match &rater.eval_metric().judge_model_options {
            Some(options) => LlmJudge::with_options(judge_model, options.clone()),
            None => LlmJudge::new(judge_model),
        };
        Self::with_judge(rater, judge)
    }

    /// Use an already configured judge
    pub fn with_judge(rater: R, judge: LlmJudge) -> Self {
        Self { rater, judge, options: EvaluationOptions::default() }
    }

    #[must_use]
    pub fn with_options(mut self, options: EvaluationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn rater(&self) -> &R {
        &self.rater
    }

    pub fn judge(&self) -> &LlmJudge {
        &self.judge
    }
}

#[async_trait]
impl<R: AutoRater> Evaluator for AutoRaterEvaluator<R> {
    fn metric_name(&self) -> &str {
        &self.rater.eval_metric().metric_name
    }

    async fn evaluate_invocations(
        &self,
        actual_invocations: &[Invocation],
        expected_invocations: &[Invocation],
    ) -> Result<EvaluationResult> {
        evaluate_with_auto_rater(
            &self.rater,
            &self.judge,
            actual_invocations,
            expected_invocations,
            &self.options,
        )
        .await
    }
}
