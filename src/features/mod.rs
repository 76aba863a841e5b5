//! # Features
//!
//! Feature modules of the bot. Each feature is self-contained and carries
//! its own version and changelog in its module documentation.

pub mod conversation;
pub mod generation;
pub mod personas;
pub mod quotes;
pub mod sessions;

// Re-export commonly used items
pub use conversation::{ConversationEngine, EngineReply};
pub use generation::{Generator, OpenAiGenerator};
pub use personas::{PersonaStore, DEFAULT_PHILOSOPHER};
pub use quotes::{QuoteLibrary, QuoteScheduler, Quotation};
pub use sessions::{ChatSession, Role, SessionRegistry, Turn};
