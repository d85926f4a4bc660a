//! Extraction backend adapters.

mod mock_extractor;
mod openai_extractor;

pub use mock_extractor::{MockExtraction, MockExtractor, RecordedCall};
pub use openai_extractor::{OpenAiExtractor, OpenAiExtractorConfig};
