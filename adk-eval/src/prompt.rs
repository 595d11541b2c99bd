//! Judge prompt templates
//!
//! Templates use `{name}` placeholders. Literal braces are written `{{` and `}}`.
//! A template is parsed and checked once, when it is built, so a bad template is
//! reported before any judge call is made.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::error::{EvalError, Result};

/// Matches escaped braces, placeholders and stray braces, in that priority
static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("Invalid regex pattern")
    })
}

/// Must start with letter or underscore, followed by letters, digits, or underscores
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A validated prompt template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse `template` and check that it uses exactly the `required` placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::ConfigError`] if a brace is unbalanced, a placeholder is
    /// not an identifier, a required placeholder is missing, or an unknown one is used.
    pub fn new(template: impl Into<String>, required: &[&str]) -> Result<Self> {
        let source = template.into();
        let segments = parse(&source)?;
        let template = Self { source, segments };

        let used = template.placeholders();
        let missing: Vec<&str> = required.iter().copied().filter(|r| !used.contains(r)).collect();
        if !missing.is_empty() {
            return Err(EvalError::ConfigError(format!(
                "prompt template is missing required placeholder(s): {}",
                missing.join(", ")
            )));
        }
        let unknown: Vec<&str> = used.iter().copied().filter(|u| !required.contains(u)).collect();
        if !unknown.is_empty() {
            return Err(EvalError::ConfigError(format!(
                "prompt template uses unknown placeholder(s): {}",
                unknown.join(", ")
            )));
        }

        Ok(template)
    }

    /// The template text as given
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of all placeholders used, sorted
    pub fn placeholders(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Substitute every placeholder. Substituted values are inserted verbatim.
    pub fn render(&self, values: &[(&str, &str)]) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = values
                        .iter()
                        .find_map(|(k, v)| (*k == name.as_str()).then_some(*v))
                        .ok_or_else(|| {
                            EvalError::ConfigError(format!(
                                "no value supplied for placeholder '{}'",
                                name
                            ))
                        })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn parse(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut last_end = 0;

    for captures in token_regex().captures_iter(template) {
        let Some(token) = captures.get(0) else { continue };
        literal.push_str(&template[last_end..token.start()]);
        last_end = token.end();

        match token.as_str() {
            "{{" => literal.push('{'),
            "}}" => literal.push('}'),
            "{" | "}" => {
                return Err(EvalError::ConfigError(format!(
                    "unbalanced '{}' at byte {} of prompt template",
                    token.as_str(),
                    token.start()
                )));
            }
            _ => {
                let name = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
                if !is_identifier(name) {
                    return Err(EvalError::ConfigError(format!(
                        "invalid placeholder '{}' in prompt template",
                        token.as_str()
                    )));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name.to_string()));
            }
        }
    }

    literal.push_str(&template[last_end..]);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Default judge prompt for final response matching.
///
/// Placeholders: `prompt`, `response`, `golden_response`, `function_api_spec`.
pub const FINAL_RESPONSE_MATCH_V2_PROMPT: &str = r#"You are an expert rater for an AI agent. Decide whether the agent's final response is valid by comparing it with a reference response.

A response is valid when it answers the user prompt with the same facts and conclusions as the reference response. Differences in wording, formatting or level of detail do not matter unless they change the meaning. Missing, contradicting or invented information makes the response invalid.

The agent had access to the following tools:
{function_api_spec}

User prompt:
{prompt}

Agent response:
{response}

Reference response:
{golden_response}

Answer with a JSON object in a ```json code block, using exactly this shape:
```json
{{
  "reasoning": "<one or two sentences>",
  "is_the_agent_response_valid": "valid" or "invalid"
}}
```"#;
