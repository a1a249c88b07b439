//! Decision providers and response parsing.
//!
//! Episode orchestration asks each classroom for a decision through the
//! [`DecisionProvider`] trait. A provider might call out to a language
//! model, replay a script, or fail outright; the orchestrator treats all of
//! them the same and falls back to its own heuristics when a provider
//! errors.
//!
//! Provider responses are free text. [`parse_decision`] extracts a
//! structured decision from whatever came back and never fails: malformed
//! input degrades to a keyword scan rather than an error.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feasibility::FeasibilityReport;

/// Longest reasoning preview kept when falling back to raw text
const REASONING_PREVIEW_CHARS: usize = 200;

/// Errors a decision provider can surface
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("decision provider unavailable")]
    Unavailable,

    #[error("decision provider timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("decision provider returned an unusable response: {0}")]
    Malformed(String),
}

/// Context handed to a provider for one classroom's decision
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRequest {
    pub classroom_id: String,
    pub congestion_ratio: f64,
    pub students: u32,
    pub capacity_per_minute: u32,
    pub suggested_adjustment: i64,
    pub feasibility: FeasibilityReport,
    pub timeout_secs: u64,
}

/// Decision recovered from a provider response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredDecision {
    #[serde(default)]
    pub decision: String,
    #[serde(default)]
    pub proposed_adjustment: Option<i64>,
    #[serde(default)]
    pub reasoning: String,
}

/// Source of per-classroom decisions
pub trait DecisionProvider {
    fn decide(&mut self, request: &DecisionRequest) -> Result<String, ProviderError>;
}

/// Extract a structured decision from a raw provider response.
///
/// Looks for the first balanced JSON object in the text and deserializes
/// it. When no such object parses, falls back to a keyword scan: the
/// decision is `accept` if the text mentions it anywhere, otherwise
/// `no_decision`, with a truncated preview of the text as reasoning.
///
/// # Example
///
/// ```
/// use exit_coordination_core::llm::parse_decision;
///
/// let parsed = parse_decision(r#"Sure: {"decision": "accept", "proposed_adjustment": -2}"#);
/// assert_eq!(parsed.decision, "accept");
/// assert_eq!(parsed.proposed_adjustment, Some(-2));
///
/// let fallback = parse_decision("I accept the proposal.");
/// assert_eq!(fallback.decision, "accept");
/// ```
pub fn parse_decision(text: &str) -> StructuredDecision {
    if let Some(json) = first_json_object(text) {
        if let Ok(mut parsed) = serde_json::from_str::<StructuredDecision>(json) {
            if parsed.decision.is_empty() {
                parsed.decision = "no_decision".to_string();
            }
            return parsed;
        }
    }

    let decision = if text.to_lowercase().contains("accept") {
        "accept"
    } else {
        "no_decision"
    };
    StructuredDecision {
        decision: decision.to_string(),
        proposed_adjustment: None,
        reasoning: preview(text),
    }
}

/// First balanced `{...}` span in the text, if any
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(REASONING_PREVIEW_CHARS) {
        Some((idx, _)) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}

/// Provider that always fails, forcing the orchestrator's fallback path
#[derive(Debug, Default)]
pub struct UnavailableProvider;

impl DecisionProvider for UnavailableProvider {
    fn decide(&mut self, _request: &DecisionRequest) -> Result<String, ProviderError> {
        Err(ProviderError::Unavailable)
    }
}

/// Provider that replays canned responses in order.
///
/// Useful for tests and scripted demos; runs dry with
/// [`ProviderError::Unavailable`] once the script is exhausted.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    responses: VecDeque<String>,
}

impl ScriptedProvider {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
        }
    }
}

impl DecisionProvider for ScriptedProvider {
    fn decide(&mut self, _request: &DecisionRequest) -> Result<String, ProviderError> {
        self.responses
            .pop_front()
            .ok_or(ProviderError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_embedded_json() {
        let parsed = parse_decision(
            "Here is my answer:\n{\"decision\": \"reject\", \"reasoning\": \"too rigid\"}\nthanks",
        );
        assert_eq!(parsed.decision, "reject");
        assert_eq!(parsed.reasoning, "too rigid");
        assert_eq!(parsed.proposed_adjustment, None);
    }

    #[test]
    fn test_nested_braces_stay_balanced() {
        let parsed = parse_decision(
            r#"{"decision": "accept", "proposed_adjustment": 2, "reasoning": "see {context}"}"#,
        );
        assert_eq!(parsed.decision, "accept");
        assert_eq!(parsed.proposed_adjustment, Some(2));
    }

    #[test]
    fn test_missing_decision_key_keeps_adjustment() {
        let parsed = parse_decision(r#"{"proposed_adjustment": 3}"#);
        assert_eq!(parsed.decision, "no_decision");
        assert_eq!(parsed.proposed_adjustment, Some(3));
    }

    #[test]
    fn test_keyword_fallback() {
        let parsed = parse_decision("We ACCEPT the stagger plan.");
        assert_eq!(parsed.decision, "accept");
        assert_eq!(parsed.reasoning, "We ACCEPT the stagger plan.");
    }

    #[test]
    fn test_no_signal_at_all() {
        let parsed = parse_decision("");
        assert_eq!(parsed.decision, "no_decision");
        assert!(parsed.reasoning.is_empty());
    }

    #[test]
    fn test_unparseable_json_falls_back() {
        let parsed = parse_decision("{not valid json} but we accept anyway");
        assert_eq!(parsed.decision, "accept");
    }

    #[test]
    fn test_long_reasoning_truncated() {
        let text = "x".repeat(500);
        let parsed = parse_decision(&text);
        assert_eq!(parsed.reasoning.len(), 200);
    }

    #[test]
    fn test_scripted_provider_exhausts() {
        let mut provider = ScriptedProvider::new(["first", "second"]);
        let request = DecisionRequest {
            classroom_id: "C101".to_string(),
            congestion_ratio: 1.2,
            students: 80,
            capacity_per_minute: 150,
            suggested_adjustment: -2,
            feasibility: crate::feasibility::FeasibilityReport {
                score: 0.8,
                is_feasible: true,
                total_adjustment: -2,
                alignment: crate::feasibility::PreferenceAlignment::StronglyAligned,
                within_limits: true,
            },
            timeout_secs: 300,
        };
        assert_eq!(provider.decide(&request).unwrap(), "first");
        assert_eq!(provider.decide(&request).unwrap(), "second");
        assert!(matches!(
            provider.decide(&request),
            Err(ProviderError::Unavailable)
        ));
    }
}
