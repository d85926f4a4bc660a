//! Intent Extractor Port - Interface for the natural-language extraction
//! backend.
//!
//! Implementations turn a user utterance, the field being elicited, and
//! recent history into a structured [`ExtractedIntent`]. The application
//! layer never lets a failed extraction reach the state machine: any error
//! degrades to an `Other` intent via [`extract_or_fallback`].

use async_trait::async_trait;
use tracing::warn;

use crate::domain::dialogue::{ExtractedIntent, Message};
use crate::domain::schema::FormFieldSpec;

/// Errors from the extraction backend.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Backend request failed: {0}")]
    Request(String),

    #[error("Backend request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Backend returned an unparseable payload: {0}")]
    MalformedResponse(String),
}

/// One extraction call's inputs.
#[derive(Debug, Clone)]
pub struct ExtractionRequest<'a> {
    /// The user's utterance for this turn.
    pub user_text: &'a str,
    /// The field currently being elicited.
    pub field: &'a FormFieldSpec,
    /// Recent transcript turns for context (already windowed by the caller).
    pub history: &'a [Message],
    /// Value awaiting confirmation, if any.
    pub pending_value: Option<&'a serde_json::Value>,
}

/// Port for intent/value extraction.
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    /// Extracts the user's intent and a best-effort typed value for the
    /// current field.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError` on transport failures, timeouts, or
    /// malformed backend payloads.
    async fn extract(&self, request: ExtractionRequest<'_>)
        -> Result<ExtractedIntent, ExtractionError>;
}

/// Runs an extraction and converts any failure into the structured fallback
/// intent. The state machine never sees an extraction error.
pub async fn extract_or_fallback(
    extractor: &dyn IntentExtractor,
    request: ExtractionRequest<'_>,
) -> ExtractedIntent {
    let field = request.field.name;
    match extractor.extract(request).await {
        Ok(intent) => intent,
        Err(err) => {
            warn!(field = %field, error = %err, "extraction failed, degrading to fallback");
            ExtractedIntent::fallback(err.to_string())
        }
    }
}
