//! # Quote Scheduler
//!
//! Posts a random quotation to the configured channel at 09:00 and 21:00
//! Tokyo time. Runs as a detached task beside the gateway; when no quote
//! channel is configured the task announces itself disabled and exits.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

use super::library::{QuoteLibrary, Quotation};
use anyhow::{Context, Result};
use chrono::{FixedOffset, Utc};
use cron::Schedule;
use log::{error, info};
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::str::FromStr;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Fire times as seconds, minutes, hours, day, month, weekday
const QUOTE_CRON: &str = "0 0 9,21 * * *";

/// Tokyo is UTC+9 year round
const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Periodic quote poster
pub struct QuoteScheduler {
    library: Arc<QuoteLibrary>,
    channel_id: Option<u64>,
    schedule: Schedule,
    timezone: FixedOffset,
}

impl QuoteScheduler {
    pub fn new(library: Arc<QuoteLibrary>, channel_id: Option<u64>) -> Result<Self> {
        let schedule =
            Schedule::from_str(QUOTE_CRON).context("invalid quote schedule expression")?;
        let timezone = FixedOffset::east_opt(JST_OFFSET_SECS)
            .ok_or_else(|| anyhow::anyhow!("invalid quote schedule offset"))?;
        Ok(QuoteScheduler {
            library,
            channel_id,
            schedule,
            timezone,
        })
    }

    /// Sleep until each fire time and post one quotation. Never returns
    /// while a quote channel is configured.
    pub async fn run(self, http: Arc<Http>) {
        let channel_id = match self.channel_id {
            Some(id) => ChannelId(id),
            None => {
                info!("📭 Quote channel not configured, daily quotes disabled");
                return;
            }
        };

        info!(
            "📅 Quote scheduler started | Channel: {channel_id} | Schedule: {QUOTE_CRON} | {} quotations loaded",
            self.library.len()
        );

        loop {
            let next = match self.schedule.upcoming(self.timezone).next() {
                Some(next) => next,
                None => {
                    error!("📅 Quote schedule produced no upcoming fire time, stopping");
                    return;
                }
            };

            let wait = next
                .signed_duration_since(Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO);
            info!("📅 Next quote at {next} (in {wait:?})");
            sleep(wait).await;

            let quotation = self.library.pick();
            let message = format_quote_message(quotation);
            match channel_id.say(&http, &message).await {
                Ok(_) => info!("📜 Posted daily quote from {}", quotation.philosopher),
                Err(e) => error!("❌ Failed to post daily quote: {e}"),
            }
        }
    }
}

/// Render a quotation the way it is posted to the channel
fn format_quote_message(quotation: &Quotation) -> String {
    format!(
        "Today's wisdom from the philosophers:\n\n**{}**\n**\"{}\"**\n(Explanation: {})",
        quotation.philosopher, quotation.quote, quotation.explanation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_schedule_expression_parses() {
        Schedule::from_str(QUOTE_CRON).unwrap();
    }

    #[test]
    fn test_schedule_fires_morning_and_evening() {
        let schedule = Schedule::from_str(QUOTE_CRON).unwrap();
        let tokyo = FixedOffset::east_opt(JST_OFFSET_SECS).unwrap();

        let times: Vec<_> = schedule.upcoming(tokyo).take(4).collect();
        assert_eq!(times.len(), 4);
        for time in &times {
            assert!(time.hour() == 9 || time.hour() == 21);
            assert_eq!(time.minute(), 0);
            assert_eq!(time.second(), 0);
        }
    }

    #[test]
    fn test_quote_message_format() {
        let quotation = Quotation {
            philosopher: "Socrates".to_string(),
            quote: "Know thyself.".to_string(),
            explanation: "An invitation to self-examination.".to_string(),
        };

        let message = format_quote_message(&quotation);
        assert!(message.starts_with("Today's wisdom from the philosophers:"));
        assert!(message.contains("**Socrates**"));
        assert!(message.contains("\"Know thyself.\""));
        assert!(message.contains("(Explanation: An invitation to self-examination.)"));
    }
}
