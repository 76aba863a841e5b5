//! # Configuration
//!
//! Environment-backed configuration for the agora bot. Everything comes from
//! process env vars; the binary loads a `.env` file before calling in here.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add SESSION_MAX_TURNS override for the conversation history bound
//! - 1.0.0: Initial release with token, model, and channel settings

use anyhow::{Context, Result};
use std::env;

/// Default chat model when OPENAI_MODEL is not set
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default cap on retained conversation turns per channel
pub const DEFAULT_MAX_TURNS: usize = 40;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Generation API key. May be empty; the message handler drops
    /// conversational traffic while it is missing.
    pub openai_api_key: String,
    pub openai_model: String,
    /// The one channel the bot converses in
    pub allowed_channel_id: u64,
    /// Optional channel for the twice-daily quote posts
    pub quote_channel_id: Option<u64>,
    /// Guild for instant command registration during development
    pub discord_guild_id: Option<String>,
    /// Cap on retained turns per session, system seed included
    pub session_max_turns: usize,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_token = env::var("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;

        // Best-effort: the bot still starts without a key, but conversational
        // messages are dropped until one is provided.
        let openai_api_key = env::var("OPENAI_API_KEY").unwrap_or_default();

        let openai_model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let allowed_channel_id = env::var("ALLOWED_CHANNEL_ID")
            .context("ALLOWED_CHANNEL_ID must be set")?
            .parse::<u64>()
            .context("ALLOWED_CHANNEL_ID must be a numeric channel id")?;

        let quote_channel_id = match env::var("QUOTE_CHANNEL_ID") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .context("QUOTE_CHANNEL_ID must be a numeric channel id")?,
            ),
            Err(_) => None,
        };

        let discord_guild_id = env::var("DISCORD_GUILD_ID").ok();

        let session_max_turns = match env::var("SESSION_MAX_TURNS") {
            Ok(raw) => raw
                .parse::<usize>()
                .context("SESSION_MAX_TURNS must be a positive integer")?,
            Err(_) => DEFAULT_MAX_TURNS,
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            discord_token,
            openai_api_key,
            openai_model,
            allowed_channel_id,
            quote_channel_id,
            discord_guild_id,
            session_max_turns,
            log_level,
        })
    }

    /// Masked form of the API key for startup logs
    pub fn masked_api_key(&self) -> String {
        mask_key(&self.openai_api_key)
    }
}

/// Mask a credential for logging: first four and last four characters of
/// anything long enough to stay unguessable, everything starred otherwise.
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key_empty() {
        assert_eq!(mask_key(""), "(not set)");
    }

    #[test]
    fn test_mask_key_short_is_fully_starred() {
        assert_eq!(mask_key("abc123"), "******");
    }

    #[test]
    fn test_mask_key_long_shows_head_and_tail() {
        let masked = mask_key("sk-proj-abcdefghijklmnopWXYZ");
        assert_eq!(masked, "sk-p...WXYZ");
        assert!(!masked.contains("abcdef"));
    }

    #[test]
    fn test_mask_key_never_leaks_middle() {
        let key = "sk-1234567890SECRETSECRET4321";
        let masked = mask_key(key);
        assert!(!masked.contains("SECRET"));
    }
}
