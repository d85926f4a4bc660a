//! Dialogue domain: session state, intents, validation, guidance, and the
//! state machine that ties one user turn together.

pub mod guidance;
mod intent;
mod machine;
mod session_state;
mod validator;
mod values;

pub use intent::{lexical_confirmation, ExtractedIntent, IntentKind};
pub use machine::{DialogueMachine, MIN_EXTRACTION_CONFIDENCE};
pub use session_state::{Message, SessionState, Speaker, HISTORY_WINDOW};
pub use validator::{validate, ConstraintViolation, ValidationFailure, ValidationOutcome};
pub use values::FieldValue;
