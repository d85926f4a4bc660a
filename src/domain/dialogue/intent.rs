//! Extracted user intent for one turn.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user is trying to do with their current utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    ProvideValue,
    Confirm,
    Deny,
    RequestHelp,
    RequestSkip,
    Other,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntentKind::ProvideValue => "provide_value",
            IntentKind::Confirm => "confirm",
            IntentKind::Deny => "deny",
            IntentKind::RequestHelp => "request_help",
            IntentKind::RequestSkip => "request_skip",
            IntentKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Result of intent/value extraction for a single user turn.
///
/// Produced fresh per turn and never persisted beyond it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedIntent {
    pub intent: IntentKind,
    pub value: Option<serde_json::Value>,
    pub confidence: f32,
    pub reasoning: String,
}

impl ExtractedIntent {
    /// Degraded result used whenever extraction fails; the state machine
    /// treats it as an unrecognized turn.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            intent: IntentKind::Other,
            value: None,
            confidence: 0.0,
            reasoning: reason.into(),
        }
    }
}

/// Affirmative tokens accepted during the confirmation loop.
const AFFIRMATIVE_TOKENS: &[&str] = &["yes", "correct", "right", "sure", "yeah", "yep", "yup"];

/// Deterministic confirm/deny resolution used while a confirmation is
/// pending. Avoids an external extraction call for a binary decision.
///
/// Any utterance containing an affirmative token confirms; everything else
/// denies.
pub fn lexical_confirmation(user_text: &str, pending_value: Option<serde_json::Value>) -> ExtractedIntent {
    let lowered = user_text.to_lowercase();
    let intent = if AFFIRMATIVE_TOKENS.iter().any(|t| lowered.contains(t)) {
        IntentKind::Confirm
    } else {
        IntentKind::Deny
    };
    ExtractedIntent {
        intent,
        value: pending_value,
        confidence: 1.0,
        reasoning: "direct confirmation/denial detection".to_string(),
    }
}
