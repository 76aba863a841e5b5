//! # Conversation Feature
//!
//! Orchestrates a chat exchange: session lookup, completion, bookkeeping.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod engine;

pub use engine::{ConversationEngine, EngineReply};
