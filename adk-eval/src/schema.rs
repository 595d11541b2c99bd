//! Invocation and eval set schema definitions
//!
//! An [`Invocation`] is one recorded turn of a conversation. Golden traces are
//! grouped into [`EvalCase`]s, which are in turn grouped into an [`EvalSet`]
//! stored as `.evalset.json`.

use adk_core::{Content, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{EvalError, Result};

/// One user turn and the agent's final answer to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// Unique identifier for this turn
    pub invocation_id: String,
    /// What the user said
    pub user_content: Content,
    /// The agent's final response. Always present as a field, possibly `None`.
    #[serde(default)]
    pub final_response: Option<Content>,
    /// Tool calls and intermediate responses produced on the way
    #[serde(default)]
    pub intermediate_data: Option<IntermediateData>,
    /// Seconds since the Unix epoch at which the turn was recorded
    #[serde(default)]
    pub creation_timestamp: f64,
}

impl Invocation {
    pub fn new(invocation_id: impl Into<String>, user_content: Content) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            user_content,
            final_response: None,
            intermediate_data: None,
            creation_timestamp: 0.0,
        }
    }

    /// Shorthand for a text-only turn
    pub fn from_text(
        invocation_id: impl Into<String>,
        user_text: &str,
        response_text: &str,
    ) -> Self {
        Self::new(invocation_id, Content::new("user").with_text(user_text))
            .with_final_response(Content::new("model").with_text(response_text))
    }

    pub fn with_final_response(mut self, content: Content) -> Self {
        self.final_response = Some(content);
        self
    }

    /// Plain text of the user content
    pub fn user_text(&self) -> String {
        get_text_from_content(Some(&self.user_content))
    }

    /// Plain text of the final response, empty when there is none
    pub fn response_text(&self) -> String {
        get_text_from_content(self.final_response.as_ref())
    }
}

/// Joins the text parts of a message with newlines.
///
/// Non-text parts are skipped and a missing message yields an empty string.
pub fn get_text_from_content(content: Option<&Content>) -> String {
    content.map(|c| c.texts().collect::<Vec<_>>().join("\n")).unwrap_or_default()
}

/// Intermediate data during a turn (tool calls, etc.)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntermediateData {
    /// Tool calls in the order they were issued
    #[serde(default)]
    pub tool_uses: Vec<ToolUse>,
    /// Responses emitted before the final one, tagged by author
    #[serde(default)]
    pub intermediate_responses: Vec<(String, Vec<Part>)>,
}

/// A tool use (function call)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    /// Tool/function name
    pub name: String,
    /// Arguments passed to the tool
    #[serde(default)]
    pub args: Value,
}

impl ToolUse {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), args: Value::Object(Default::default()) }
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }
}

/// Session configuration the golden trace was recorded with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub state: HashMap<String, Value>,
}

/// A single golden conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCase {
    /// Unique identifier for this case
    pub eval_id: String,
    /// The expected invocations, in conversation order
    pub conversation: Vec<Invocation>,
    #[serde(default)]
    pub session_input: Option<SessionInput>,
    /// Seconds since the Unix epoch at which the case was created
    #[serde(default)]
    pub creation_timestamp: f64,
}

/// A named collection of golden conversations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSet {
    /// Unique identifier
    pub eval_set_id: String,
    /// Human-readable name
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub eval_cases: Vec<EvalCase>,
}

impl EvalSet {
    /// Load an eval set from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EvalError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse an eval set from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        let eval_set: EvalSet = serde_json::from_str(json)?;
        Ok(eval_set)
    }

    /// Save eval set to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Find a case by id
    pub fn case(&self, eval_id: &str) -> Option<&EvalCase> {
        self.eval_cases.iter().find(|c| c.eval_id == eval_id)
    }
}
