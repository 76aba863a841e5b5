//! # Personas Feature
//!
//! Process-wide philosopher persona selection and instruction derivation.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial release with the Socrates default

pub mod store;

pub use store::{PersonaStore, DEFAULT_PHILOSOPHER};
