//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! domain and the outside world. Adapters implement these ports.
//!
//! - `IntentExtractor` - natural-language intent/value extraction backend
//! - `SessionStore` - persistence for conversation sessions

mod extractor;
mod session_store;

pub use extractor::{extract_or_fallback, ExtractionError, ExtractionRequest, IntentExtractor};
pub use session_store::{SessionStore, SessionStoreError};
