//! Adapters - Implementations of the ports.

pub mod extraction;
pub mod storage;

pub use extraction::{MockExtraction, MockExtractor, OpenAiExtractor, OpenAiExtractorConfig, RecordedCall};
pub use storage::InMemorySessionStore;
