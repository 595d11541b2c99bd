//! Evaluation result model
//!
//! Per-invocation outcomes and the verdict aggregated from them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EvalError, Result};
use crate::schema::Invocation;

/// Outcome of comparing a score with a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalStatus {
    Passed,
    Failed,
    /// The metric was not run, e.g. skipped by the caller
    NotEvaluated,
}

impl fmt::Display for EvalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvalStatus::Passed => "passed",
            EvalStatus::Failed => "failed",
            EvalStatus::NotEvaluated => "not_evaluated",
        };
        f.write_str(s)
    }
}

/// Classify a score against a threshold. Reaching the threshold passes.
pub fn get_eval_status(score: f64, threshold: f64) -> EvalStatus {
    if score >= threshold { EvalStatus::Passed } else { EvalStatus::Failed }
}

/// Result for a single invocation pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerInvocationResult {
    pub actual_invocation: Invocation,
    pub expected_invocation: Invocation,
    pub score: f64,
    pub eval_status: EvalStatus,
}

impl PerInvocationResult {
    /// Build a result whose status is derived from `score` and `threshold`
    pub fn new(
        actual_invocation: Invocation,
        expected_invocation: Invocation,
        score: f64,
        threshold: f64,
    ) -> Self {
        Self {
            actual_invocation,
            expected_invocation,
            score,
            eval_status: get_eval_status(score, threshold),
        }
    }
}

/// Result for a whole trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Overall score (0.0 - 1.0)
    pub overall_score: f64,
    pub overall_eval_status: EvalStatus,
    /// One entry per evaluated invocation, in trace order
    pub per_invocation_results: Vec<PerInvocationResult>,
}

impl EvaluationResult {
    /// Build a result from a non-empty set of invocation results
    pub fn new(
        overall_score: f64,
        threshold: f64,
        per_invocation_results: Vec<PerInvocationResult>,
    ) -> Result<Self> {
        if per_invocation_results.is_empty() {
            return Err(EvalError::EmptyResultSet);
        }
        Ok(Self {
            overall_score,
            overall_eval_status: get_eval_status(overall_score, threshold),
            per_invocation_results,
        })
    }

    pub fn passed(&self) -> bool {
        self.overall_eval_status == EvalStatus::Passed
    }

    /// Invocation results that did not pass
    pub fn failures(&self) -> impl Iterator<Item = &PerInvocationResult> {
        self.per_invocation_results.iter().filter(|r| r.eval_status != EvalStatus::Passed)
    }

    /// Export to JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
