//! # Sessions Feature
//!
//! Lazily created, bounded, per-channel conversation histories.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Bound history growth and serialize generations per channel
//! - 1.0.0: Initial release

pub mod registry;

pub use registry::{ChatSession, Role, SessionRegistry, Turn};
