//! # Quotes Feature
//!
//! A small library of philosopher quotations and the scheduler that posts
//! one to Discord every morning and evening.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

pub mod library;
pub mod scheduler;

pub use library::{QuoteLibrary, Quotation};
pub use scheduler::QuoteScheduler;
