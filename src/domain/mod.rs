//! Domain layer containing the form schema and dialogue logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers)
//! - `schema` - Static form field declarations and constraints
//! - `dialogue` - Session state, intents, validation, and the state machine

pub mod dialogue;
pub mod foundation;
pub mod schema;
