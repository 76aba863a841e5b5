// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Application layer
pub mod command_handler;
pub mod commands;

// Re-export core config
pub use core::Config;

// Re-export feature items
pub use features::{
    // Conversation
    ConversationEngine, EngineReply,
    // Generation
    Generator, OpenAiGenerator,
    // Personas
    PersonaStore, DEFAULT_PHILOSOPHER,
    // Quotes
    QuoteLibrary, QuoteScheduler, Quotation,
    // Sessions
    ChatSession, Role, SessionRegistry, Turn,
};
