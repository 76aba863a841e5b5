//! # Quote Library
//!
//! Philosopher quotations bundled into the binary at compile time.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

use anyhow::{ensure, Context, Result};
use rand::Rng;
use serde::Deserialize;

/// Quotation data embedded at compile time
const QUOTES_JSON: &str = include_str!("../../../quotes.json");

/// One entry from the bundled quote data
#[derive(Debug, Clone, Deserialize)]
pub struct Quotation {
    pub philosopher: String,
    pub quote: String,
    pub explanation: String,
}

/// The full set of bundled quotations
pub struct QuoteLibrary {
    quotations: Vec<Quotation>,
}

impl QuoteLibrary {
    /// Parse the bundled quote data. Fails if the data is malformed or empty.
    pub fn load() -> Result<Self> {
        let quotations: Vec<Quotation> =
            serde_json::from_str(QUOTES_JSON).context("failed to parse bundled quote data")?;
        ensure!(!quotations.is_empty(), "bundled quote data is empty");
        Ok(QuoteLibrary { quotations })
    }

    /// Pick a quotation uniformly at random
    pub fn pick(&self) -> &Quotation {
        let idx = rand::rng().random_range(0..self.quotations.len());
        &self.quotations[idx]
    }

    pub fn len(&self) -> usize {
        self.quotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotations.is_empty()
    }
}
