//! # adk-eval
//!
//! LLM-judged evaluation of agent conversations for ADK-Rust.
//!
//! An agent's recorded trace is compared with a golden trace invocation by
//! invocation. A judge model gives a verdict on each pair, the verdicts become
//! scores, and the scores are aggregated into one pass/fail result.
//!
//! ## Features
//!
//! - **Auto-raters**: the [`AutoRater`] trait splits judging into prompt
//!   formatting, answer scoring and aggregation; the driving loop is shared
//! - **Final response matching**: [`FinalResponseMatchV2Evaluator`] asks the judge
//!   whether the agent's answer is equivalent to the golden answer
//! - **Bounded concurrency**: judge calls for one trace run in parallel, up to a limit
//! - **Typed failures**: malformed judge output is an error, never a silent zero
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use adk_eval::{
//!     AutoRaterEvaluator, EvalMetric, Evaluator, FinalResponseMatchV2Evaluator, Invocation,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let judge_model = create_judge_model()?;
//!
//!     let metric = EvalMetric::final_response_match_v2(0.8)?;
//!     let rater = FinalResponseMatchV2Evaluator::new(metric)?;
//!     let evaluator = AutoRaterEvaluator::new(rater, judge_model);
//!
//!     let expected = vec![Invocation::from_text("inv_1", "Capital of France?", "Paris")];
//!     let actual = vec![Invocation::from_text("inv_1", "Capital of France?", "It's Paris.")];
//!
//!     let result = evaluator.evaluate_invocations(&actual, &expected).await?;
//!     assert!(result.passed(), "score {}", result.overall_score);
//!     Ok(())
//! }
//! ```

pub mod auto_rater;
pub mod error;
pub mod evaluator;
pub mod llm_judge;
pub mod metric;
pub mod prompt;
pub mod response_match;
pub mod result;
pub mod schema;

// Re-exports
pub use auto_rater::{AutoRater, evaluate_with_auto_rater};
pub use error::{EvalError, Result};
pub use evaluator::{AutoRaterEvaluator, EvaluationOptions, Evaluator};
pub use llm_judge::LlmJudge;
pub use metric::{EvalMetric, JudgeModelOptions, PrebuiltMetric};
pub use prompt::{FINAL_RESPONSE_MATCH_V2_PROMPT, PromptTemplate};
pub use response_match::FinalResponseMatchV2Evaluator;
pub use result::{EvalStatus, EvaluationResult, PerInvocationResult, get_eval_status};
pub use schema::{
    EvalCase, EvalSet, IntermediateData, Invocation, SessionInput, ToolUse, get_text_from_content,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::auto_rater::AutoRater;
    pub use crate::error::{EvalError, Result};
    pub use crate::evaluator::{AutoRaterEvaluator, EvaluationOptions, Evaluator};
    pub use crate::metric::EvalMetric;
    pub use crate::response_match::FinalResponseMatchV2Evaluator;
    pub use crate::result::{EvalStatus, EvaluationResult, PerInvocationResult};
    pub use crate::schema::{EvalCase, EvalSet, Invocation};
}
