//! # Generation Client
//!
//! The bridge to the chat-completion API. `Generator` is the seam the
//! conversation engine talks through; `OpenAiGenerator` is the production
//! implementation. The API key is read from the environment by the openai
//! crate itself, exported there by the binary at startup.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial release with 45-second completion timeout

use crate::features::sessions::{Role, Turn};
use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use openai::chat::{ChatCompletion, ChatCompletionMessage, ChatCompletionMessageRole};
use tokio::time::{timeout, Duration, Instant};
use uuid::Uuid;

/// Seconds before an in-flight completion is abandoned
const COMPLETION_TIMEOUT_SECS: u64 = 45;

/// Seam between the conversation engine and the completion service.
///
/// Implementations either return the generated text (possibly empty when the
/// service succeeds with nothing to say) or fail opaquely. Callers never
/// interpret the error beyond resetting the session.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        instruction: &str,
        history: &[Turn],
        user_text: &str,
        request_id: Uuid,
    ) -> Result<String>;
}

/// Chat-completion client for the OpenAI API
pub struct OpenAiGenerator {
    model: String,
}

impl OpenAiGenerator {
    pub fn new(model: String) -> Self {
        OpenAiGenerator { model }
    }
}

/// Assemble the outbound message list: instruction, prior turns, new text
fn build_messages(
    instruction: &str,
    history: &[Turn],
    user_text: &str,
) -> Vec<ChatCompletionMessage> {
    let mut messages = vec![ChatCompletionMessage {
        role: ChatCompletionMessageRole::System,
        content: Some(instruction.to_string()),
        name: None,
        function_call: None,
        tool_call_id: None,
        tool_calls: None,
    }];

    for turn in history {
        let role = match turn.role {
            Role::User => ChatCompletionMessageRole::User,
            Role::Assistant => ChatCompletionMessageRole::Assistant,
            // The instruction parameter already carries the system seed.
            Role::System => continue,
        };
        messages.push(ChatCompletionMessage {
            role,
            content: Some(turn.text.clone()),
            name: None,
            function_call: None,
            tool_call_id: None,
            tool_calls: None,
        });
    }

    messages.push(ChatCompletionMessage {
        role: ChatCompletionMessageRole::User,
        content: Some(user_text.to_string()),
        name: None,
        function_call: None,
        tool_call_id: None,
        tool_calls: None,
    });

    messages
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(
        &self,
        instruction: &str,
        history: &[Turn],
        user_text: &str,
        request_id: Uuid,
    ) -> Result<String> {
        let start_time = Instant::now();

        info!(
            "[{}] 🤖 Starting completion request | Model: {} | History turns: {}",
            request_id,
            self.model,
            history.len()
        );
        debug!(
            "[{}] 📝 Instruction length: {} chars | User text preview: '{}'",
            request_id,
            instruction.len(),
            user_text.chars().take(100).collect::<String>()
        );

        let messages = build_messages(instruction, history, user_text);
        debug!(
            "[{}] 🔨 Outbound message count: {}",
            request_id,
            messages.len()
        );

        let completion_future = ChatCompletion::builder(&self.model, messages).create();

        let chat_completion = timeout(
            Duration::from_secs(COMPLETION_TIMEOUT_SECS),
            completion_future,
        )
        .await
        .map_err(|_| {
            let elapsed = start_time.elapsed();
            error!("[{request_id}] ⏱️ Completion request timed out after {elapsed:?}");
            anyhow::anyhow!("completion request timed out after {COMPLETION_TIMEOUT_SECS} seconds")
        })?
        .map_err(|e| {
            let elapsed = start_time.elapsed();
            error!("[{request_id}] ❌ Completion API error after {elapsed:?}: {e}");
            anyhow::anyhow!("completion API error: {}", e)
        })?;

        let elapsed = start_time.elapsed();
        info!("[{request_id}] ✅ Completion received after {elapsed:?}");

        if let Some(usage) = &chat_completion.usage {
            debug!(
                "[{request_id}] 📊 Token usage - Prompt: {}, Completion: {}, Total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        // A successful response with no usable text is reported as empty, not
        // as an error; the engine sends its distinct empty-reply notice.
        let response = match chat_completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
        {
            Some(content) => content.trim().to_string(),
            None => {
                warn!("[{request_id}] 💭 Completion succeeded with no content");
                String::new()
            }
        };

        info!(
            "[{}] ✅ Completion processed | Length: {} chars",
            request_id,
            response.len()
        );

        Ok(response)
    }
}
