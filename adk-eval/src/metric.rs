//! Evaluation metric definitions
//!
//! A metric names a scoring rule and the threshold its overall score must reach.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{EvalError, Result};

/// Metrics shipped with this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrebuiltMetric {
    /// LLM-judged match between the agent's final response and the golden one
    FinalResponseMatchV2,
}

impl PrebuiltMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrebuiltMetric::FinalResponseMatchV2 => "final_response_match_v2",
        }
    }
}

impl fmt::Display for PrebuiltMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for one scoring rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalMetric {
    /// Metric identifier
    pub metric_name: String,
    /// Minimum overall score (0.0 - 1.0) to pass
    pub threshold: f64,
    /// Options for the judge model, for LLM-judged metrics
    #[serde(default)]
    pub judge_model_options: Option<JudgeModelOptions>,
}

impl EvalMetric {
    /// Create a metric, rejecting thresholds outside `[0.0, 1.0]`
    pub fn new(metric_name: impl Into<String>, threshold: f64) -> Result<Self> {
        let metric =
            Self { metric_name: metric_name.into(), threshold, judge_model_options: None };
        metric.validate()?;
        Ok(metric)
    }

    /// Shorthand for [`PrebuiltMetric::FinalResponseMatchV2`]
    pub fn final_response_match_v2(threshold: f64) -> Result<Self> {
        Self::new(PrebuiltMetric::FinalResponseMatchV2.as_str(), threshold)
    }

    pub fn with_judge_model_options(mut self, options: JudgeModelOptions) -> Self {
        self.judge_model_options = Some(options);
        self
    }

    /// Check the invariants a deserialized metric may have skipped
    pub fn validate(&self) -> Result<()> {
        if self.metric_name.trim().is_empty() {
            return Err(EvalError::ConfigError("metric name must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(EvalError::ConfigError(format!(
                "threshold for {} must be within [0.0, 1.0], got {}",
                self.metric_name, self.threshold
            )));
        }
        Ok(())
    }
}

/// Options for the judge model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeModelOptions {
    /// Model to use for judging
    #[serde(default = "default_judge_model")]
    pub judge_model: String,
    /// Temperature for judge (low for consistency)
    #[serde(default)]
    pub temperature: f32,
    /// Maximum tokens for judge response
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: i32,
    /// Upper bound on a single judge call
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl Default for JudgeModelOptions {
    fn default() -> Self {
        Self {
            judge_model: default_judge_model(),
            temperature: 0.0,
            max_output_tokens: default_max_output_tokens(),
            timeout: None,
        }
    }
}

impl JudgeModelOptions {
    pub fn with_judge_model(mut self, judge_model: impl Into<String>) -> Self {
        self.judge_model = judge_model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn default_judge_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_output_tokens() -> i32 {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds() {
        assert!(EvalMetric::final_response_match_v2(0.0).is_ok());
        assert!(EvalMetric::final_response_match_v2(1.0).is_ok());
        assert!(matches!(
            EvalMetric::final_response_match_v2(1.2),
            Err(EvalError::ConfigError(_))
        ));
        assert!(matches!(
            EvalMetric::final_response_match_v2(f64::NAN),
            Err(EvalError::ConfigError(_))
        ));
        assert!(EvalMetric::new("  ", 0.5).is_err());
    }

    #[test]
    fn test_metric_from_json_uses_defaults() {
        let metric: EvalMetric = serde_json::from_str(
            r#"{"metric_name": "final_response_match_v2", "threshold": 0.8, "judge_model_options": {}}"#,
        )
        .unwrap();
        metric.validate().unwrap();
        assert_eq!(metric.metric_name, PrebuiltMetric::FinalResponseMatchV2.to_string());

        let options = metric.judge_model_options.unwrap();
        assert_eq!(options, JudgeModelOptions::default());
        assert_eq!(options.max_output_tokens, 1024);
    }
}
