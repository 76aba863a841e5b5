//! # Command Handler
//!
//! Routes incoming Discord traffic: free-form messages in the allowed
//! channel go through the conversation engine, slash commands manage the
//! philosopher selection and session lifecycle.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Distinct notice for empty completions
//! - 1.1.0: Slash commands (/set_philosopher, /reset_chat)
//! - 1.0.0: Initial release

use crate::commands::slash::get_string_option;
use crate::core::config::mask_key;
use crate::core::response::{chunk_for_message, MESSAGE_LIMIT};
use crate::features::conversation::{ConversationEngine, EngineReply};
use crate::features::personas::PersonaStore;
use crate::features::sessions::SessionRegistry;
use anyhow::Result;
use log::{debug, error, info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;
use uuid::Uuid;

/// Sent when generation failed and the session was discarded
const GENERATION_FAILED_REPLY: &str =
    "❌ Sorry, an error occurred while generating a response. The conversation context has been reset.";

/// Sent when the service succeeded but produced no usable text
const EMPTY_RESPONSE_REPLY: &str =
    "💭 The model returned an empty response. Please try sending your message again.";

pub struct CommandHandler {
    engine: ConversationEngine,
    sessions: Arc<SessionRegistry>,
    personas: Arc<PersonaStore>,
    allowed_channel_id: u64,
    openai_key_fingerprint: Option<String>,
}

impl CommandHandler {
    pub fn new(
        engine: ConversationEngine,
        sessions: Arc<SessionRegistry>,
        personas: Arc<PersonaStore>,
        allowed_channel_id: u64,
        openai_key: &str,
    ) -> Self {
        let openai_key_fingerprint = if openai_key.is_empty() {
            None
        } else {
            Some(mask_key(openai_key))
        };

        CommandHandler {
            engine,
            sessions,
            personas,
            allowed_channel_id,
            openai_key_fingerprint,
        }
    }

    /// Whether a message should get a generated response.
    ///
    /// Bot authors, channels outside the allow-list, blank content, and
    /// slash-style text are all ignored.
    fn should_respond(
        author_is_bot: bool,
        channel_id: u64,
        allowed_channel_id: u64,
        content: &str,
    ) -> bool {
        !author_is_bot
            && channel_id == allowed_channel_id
            && !content.trim().is_empty()
            && !content.starts_with('/')
    }

    pub async fn handle_message(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let request_id = Uuid::new_v4();
        let channel_id = msg.channel_id.0;

        info!(
            "[{}] 📥 Message received | User: {} | Channel: {} | Length: {} chars",
            request_id,
            msg.author.id,
            channel_id,
            msg.content.len()
        );

        if !Self::should_respond(
            msg.author.bot,
            channel_id,
            self.allowed_channel_id,
            &msg.content,
        ) {
            if msg.author.bot {
                debug!("[{request_id}] 🔍 Ignoring message from bot author");
            } else if channel_id != self.allowed_channel_id {
                debug!(
                    "[{request_id}] 🔍 Ignoring message outside allowed channel {}",
                    self.allowed_channel_id
                );
            } else {
                debug!("[{request_id}] 🔍 Ignoring blank or slash-style message");
            }
            return Ok(());
        }

        match &self.openai_key_fingerprint {
            Some(fingerprint) => {
                debug!("[{request_id}] 🔑 OpenAI key loaded ({fingerprint})");
            }
            None => {
                warn!("[{request_id}] 🔑 OpenAI key not configured, dropping message");
                return Ok(());
            }
        }

        debug!("[{request_id}] ⌨️ Starting typing indicator");
        let typing = msg.channel_id.start_typing(&ctx.http)?;

        info!("[{request_id}] 🚀 Running conversation exchange");
        let reply = self.engine.respond(channel_id, &msg.content, request_id).await;

        typing.stop();
        debug!("[{request_id}] ⌨️ Stopped typing indicator");

        match reply {
            Ok(EngineReply::Text(text)) => {
                info!(
                    "[{}] ✅ Response generated | Length: {} chars",
                    request_id,
                    text.len()
                );

                if text.len() > MESSAGE_LIMIT {
                    let chunks = chunk_for_message(&text);
                    debug!(
                        "[{}] 📄 Response too long, splitting into {} chunks",
                        request_id,
                        chunks.len()
                    );

                    // First chunk as threaded reply
                    if let Some(first_chunk) = chunks.first() {
                        msg.reply(&ctx.http, first_chunk).await?;
                        debug!("[{request_id}] ✅ First chunk sent as reply");
                    }
                    for chunk in chunks.iter().skip(1) {
                        msg.channel_id.say(&ctx.http, chunk).await?;
                    }
                    info!("[{request_id}] ✅ All response chunks sent successfully");
                } else {
                    msg.reply(&ctx.http, &text).await?;
                    info!("[{request_id}] ✅ Response sent successfully");
                }
            }
            Ok(EngineReply::Empty) => {
                info!("[{request_id}] 💭 Empty completion, sending retry notice");
                msg.reply(&ctx.http, EMPTY_RESPONSE_REPLY).await?;
            }
            Err(e) => {
                error!("[{request_id}] ❌ Generation error: {e}");
                debug!("[{request_id}] 📤 Sending error message to user as reply");
                msg.reply(&ctx.http, GENERATION_FAILED_REPLY).await?;
                warn!("[{request_id}] ⚠️ Error message sent to user after generation failure");
            }
        }

        info!("[{request_id}] ✅ Message processing completed");
        Ok(())
    }

    pub async fn handle_slash_command(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let channel_id = command.channel_id.0;

        info!(
            "[{}] 📥 Slash command received | Command: {} | User: {} | Channel: {}",
            request_id, command.data.name, command.user.id, channel_id
        );

        match command.data.name.as_str() {
            "set_philosopher" => {
                debug!("[{request_id}] 🎭 Handling set_philosopher command");
                match get_string_option(&command.data.options, "name") {
                    Some(name) => {
                        let existed = self.sessions.reset(channel_id, Some(&name)).await;
                        info!(
                            "[{}] 🎭 Philosopher set to '{}' | Session existed: {} | Now: {}",
                            request_id,
                            name,
                            existed,
                            self.personas.current().await
                        );
                        let confirmation = format!(
                            "🏛️ Now in dialogue with **{name}**. The conversation context has been reset."
                        );
                        command
                            .create_interaction_response(&ctx.http, |response| {
                                response
                                    .kind(serenity::model::application::interaction::InteractionResponseType::ChannelMessageWithSource)
                                    .interaction_response_data(|message| {
                                        message.content(confirmation)
                                    })
                            })
                            .await?;
                    }
                    None => {
                        warn!("[{request_id}] ❌ set_philosopher missing required name option");
                        command
                            .create_interaction_response(&ctx.http, |response| {
                                response
                                    .kind(serenity::model::application::interaction::InteractionResponseType::ChannelMessageWithSource)
                                    .interaction_response_data(|message| {
                                        message.content("❌ The `name` option is required.")
                                    })
                            })
                            .await?;
                    }
                }
            }
            "reset_chat" => {
                debug!("[{request_id}] 🧹 Handling reset_chat command");
                let existed = self.sessions.reset(channel_id, None).await;
                info!(
                    "[{request_id}] 🧹 Session reset for channel {channel_id} | Session existed: {existed}"
                );
                command
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(serenity::model::application::interaction::InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| {
                                message.content(
                                    "🧹 The conversation context has been reset. You can start a new dialogue.",
                                )
                            })
                    })
                    .await?;
            }
            unknown => {
                warn!("[{request_id}] ❓ Unknown slash command: {unknown}");
                command
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(serenity::model::application::interaction::InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| message.content("❓ Unknown command."))
                    })
                    .await?;
            }
        }

        info!("[{request_id}] ✅ Slash command processing completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: u64 = 1000;

    #[test]
    fn test_should_respond_in_allowed_channel() {
        assert!(CommandHandler::should_respond(
            false,
            ALLOWED,
            ALLOWED,
            "What is justice?"
        ));
    }

    #[test]
    fn test_should_not_respond_to_bots() {
        assert!(!CommandHandler::should_respond(
            true,
            ALLOWED,
            ALLOWED,
            "What is justice?"
        ));
    }

    #[test]
    fn test_should_not_respond_outside_allowed_channel() {
        assert!(!CommandHandler::should_respond(
            false,
            ALLOWED + 1,
            ALLOWED,
            "What is justice?"
        ));
    }

    #[test]
    fn test_should_not_respond_to_slash_style_text() {
        assert!(!CommandHandler::should_respond(
            false,
            ALLOWED,
            ALLOWED,
            "/set_philosopher name:Plato"
        ));
    }

    #[test]
    fn test_should_not_respond_to_blank_content() {
        assert!(!CommandHandler::should_respond(false, ALLOWED, ALLOWED, "   "));
    }
}
