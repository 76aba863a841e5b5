//! # Generation Feature
//!
//! Text generation through the OpenAI chat-completion API.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod client;

pub use client::{Generator, OpenAiGenerator};
