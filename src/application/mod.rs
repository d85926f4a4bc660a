//! Application layer - command handlers orchestrating ports and domain.

mod get_conversation;
mod process_turn;
mod start_conversation;

pub use get_conversation::{GetConversationError, GetConversationHandler};
pub use process_turn::{
    CaptureOutcome, ProcessTurnCommand, ProcessTurnError, ProcessTurnHandler, ProcessTurnResult,
    TurnStatus,
};
pub use start_conversation::{
    StartConversationError, StartConversationHandler, StartConversationResult,
};
