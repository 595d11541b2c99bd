//! Error types for the evaluation framework

use std::time::Duration;
use thiserror::Error;

/// Result type alias for evaluation operations
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur during evaluation
#[derive(Error, Debug)]
pub enum EvalError {
    /// Invalid configuration: bad template, threshold or trace pairing.
    /// Always raised before the judge is called.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The judge answered with something that is not a usable verdict
    #[error("Failed to parse auto rater response ({reason}): {raw:?}")]
    JudgeOutputParse {
        /// The judge's text exactly as received
        raw: String,
        /// What was wrong with it
        reason: String,
    },

    /// Aggregation was asked to summarize zero invocation results
    #[error("Cannot aggregate an empty set of invocation results")]
    EmptyResultSet,

    /// The judge model call itself failed
    #[error("LLM judge error: {0}")]
    JudgeInvocation(#[from] adk_core::AdkError),

    /// The judge model call did not finish in time
    #[error("LLM judge timed out after {0:?}")]
    JudgeTimeout(Duration),

    /// A failure tied to one invocation of the trace
    #[error("Invocation {index}: {source}")]
    AtInvocation {
        /// Zero-based position of the invocation within the trace
        index: usize,
        #[source]
        source: Box<EvalError>,
    },

    /// Failed to load an eval set file
    #[error("Failed to load eval set: {0}")]
    LoadError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl EvalError {
    pub(crate) fn judge_output(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        EvalError::JudgeOutputParse { raw: raw.into(), reason: reason.into() }
    }

    /// Attach the index of the offending invocation
    pub fn at_invocation(self, index: usize) -> Self {
        EvalError::AtInvocation { index, source: Box::new(self) }
    }

    /// Index of the offending invocation, when known
    pub fn invocation_index(&self) -> Option<usize> {
        match self {
            EvalError::AtInvocation { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The error with any invocation context stripped away
    pub fn root(&self) -> &EvalError {
        match self {
            EvalError::AtInvocation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Raw judge text for parse failures, for diagnostics
    pub fn raw_judge_output(&self) -> Option<&str> {
        match self.root() {
            EvalError::JudgeOutputParse { raw, .. } => Some(raw.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_context_is_preserved() {
        let err = EvalError::judge_output("not json at all", "expected value").at_invocation(3);
        assert_eq!(err.invocation_index(), Some(3));
        assert_eq!(err.raw_judge_output(), Some("not json at all"));
        assert!(matches!(err.root(), EvalError::JudgeOutputParse { .. }));
        assert!(err.to_string().starts_with("Invocation 3:"));
    }

    #[test]
    fn test_model_error_converts() {
        let err: EvalError = adk_core::AdkError::Timeout("deadline exceeded".into()).into();
        assert!(matches!(err, EvalError::JudgeInvocation(_)));
        assert_eq!(err.raw_judge_output(), None);
    }
}
