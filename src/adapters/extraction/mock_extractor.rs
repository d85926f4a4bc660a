//! Mock intent extractor for testing.
//!
//! Returns pre-configured results in order and records every request, so
//! tests can drive the state machine without a real extraction backend.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::dialogue::{ExtractedIntent, IntentKind};
use crate::ports::{ExtractionError, ExtractionRequest, IntentExtractor};

/// A configured mock result.
#[derive(Debug, Clone)]
pub enum MockExtraction {
    /// Return this intent.
    Intent(ExtractedIntent),
    /// Fail with a request error.
    RequestError(String),
    /// Fail with a malformed-response error.
    MalformedResponse(String),
}

/// Record of one extraction call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub user_text: String,
    pub field: String,
    pub history_len: usize,
}

/// Scripted extractor: responses are consumed in order; once the script is
/// exhausted, every call returns the fallback-triggering error.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    responses: Arc<Mutex<VecDeque<MockExtraction>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an intent to return.
    pub fn with_intent(self, intent: ExtractedIntent) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockExtraction::Intent(intent));
        self
    }

    /// Queues a `ProvideValue` intent with high confidence.
    pub fn with_value(self, value: serde_json::Value) -> Self {
        self.with_intent(ExtractedIntent {
            intent: IntentKind::ProvideValue,
            value: Some(value),
            confidence: 0.95,
            reasoning: "scripted".to_string(),
        })
    }

    /// Queues a bare intent with no value.
    pub fn with_kind(self, kind: IntentKind) -> Self {
        self.with_intent(ExtractedIntent {
            intent: kind,
            value: None,
            confidence: 0.95,
            reasoning: "scripted".to_string(),
        })
    }

    /// Queues an error.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockExtraction::RequestError(message.into()));
        self
    }

    /// Requests seen so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl IntentExtractor for MockExtractor {
    async fn extract(
        &self,
        request: ExtractionRequest<'_>,
    ) -> Result<ExtractedIntent, ExtractionError> {
        self.calls.lock().unwrap().push(RecordedCall {
            user_text: request.user_text.to_string(),
            field: request.field.name.to_string(),
            history_len: request.history.len(),
        });

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(MockExtraction::Intent(intent)) => Ok(intent),
            Some(MockExtraction::RequestError(message)) => Err(ExtractionError::Request(message)),
            Some(MockExtraction::MalformedResponse(message)) => {
                Err(ExtractionError::MalformedResponse(message))
            }
            None => Err(ExtractionError::Request("mock script exhausted".into())),
        }
    }
}
