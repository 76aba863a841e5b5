//! # Conversation Engine
//!
//! Ties the session registry to the generator. One call per incoming user
//! message: look up (or seed) the channel session, hold its lock for the
//! whole exchange so a channel never has two completions in flight, and
//! record the turns that survive.
//!
//! On generation failure the channel's session is discarded so the next
//! message starts from a fresh seed. An empty-but-successful completion
//! keeps the session as is.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Empty completions no longer reset the session
//! - 1.0.0: Initial release

use crate::features::generation::Generator;
use crate::features::sessions::SessionRegistry;
use anyhow::Result;
use log::{debug, error, info};
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of a successful exchange
#[derive(Debug, PartialEq, Eq)]
pub enum EngineReply {
    /// The generated text, trimmed, ready to send
    Text(String),
    /// The service answered but produced no usable text
    Empty,
}

/// Drives one exchange per incoming message
pub struct ConversationEngine {
    sessions: Arc<SessionRegistry>,
    generator: Arc<dyn Generator>,
}

impl ConversationEngine {
    pub fn new(sessions: Arc<SessionRegistry>, generator: Arc<dyn Generator>) -> Self {
        ConversationEngine {
            sessions,
            generator,
        }
    }

    /// Run one exchange in the given channel.
    ///
    /// The session mutex is held across the completion call, which keeps
    /// requests for the same channel strictly sequential. Other channels
    /// proceed independently.
    pub async fn respond(
        &self,
        channel_id: u64,
        user_text: &str,
        request_id: Uuid,
    ) -> Result<EngineReply> {
        let session = self.sessions.get_or_create(channel_id).await;
        let mut guard = session.lock().await;

        debug!(
            "[{}] 🗣️ Responding in channel {} | Prior turns: {}",
            request_id,
            channel_id,
            guard.len()
        );

        let instruction = guard.instruction().to_string();
        let history = guard.history().to_vec();
        guard.push_user(user_text);

        let raw = match self
            .generator
            .generate(&instruction, &history, user_text, request_id)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                error!(
                    "[{request_id}] ❌ Generation failed for channel {channel_id}, discarding session: {e}"
                );
                drop(guard);
                self.sessions.reset(channel_id, None).await;
                return Err(e);
            }
        };

        let text = raw.trim();
        if text.is_empty() {
            info!("[{request_id}] 💭 Empty completion for channel {channel_id} | Session kept");
            return Ok(EngineReply::Empty);
        }

        guard.push_assistant(text);
        debug!(
            "[{}] 📜 Recorded exchange for channel {} | Session now {} turns",
            request_id,
            channel_id,
            guard.len()
        );

        Ok(EngineReply::Text(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::personas::PersonaStore;
    use crate::features::sessions::{Role, Turn};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::{sleep, Duration};

    const CHANNEL: u64 = 4242;
    const OTHER_CHANNEL: u64 = 9999;

    struct RecordedCall {
        instruction: String,
        history: Vec<Turn>,
        user_text: String,
    }

    /// Replays canned replies in order and records what it was asked
    struct ScriptedGenerator {
        replies: Vec<String>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedGenerator {
        fn new(replies: &[&str]) -> Self {
            ScriptedGenerator {
                replies: replies.iter().map(|r| r.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(
            &self,
            instruction: &str,
            history: &[Turn],
            user_text: &str,
            _request_id: Uuid,
        ) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                instruction: instruction.to_string(),
                history: history.to_vec(),
                user_text: user_text.to_string(),
            });
            Ok(self
                .replies
                .get(calls.len() - 1)
                .cloned()
                .unwrap_or_default())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn generate(
            &self,
            _instruction: &str,
            _history: &[Turn],
            _user_text: &str,
            _request_id: Uuid,
        ) -> Result<String> {
            Err(anyhow::anyhow!("upstream unavailable"))
        }
    }

    struct EmptyGenerator;

    #[async_trait]
    impl Generator for EmptyGenerator {
        async fn generate(
            &self,
            _instruction: &str,
            _history: &[Turn],
            _user_text: &str,
            _request_id: Uuid,
        ) -> Result<String> {
            Ok("   ".to_string())
        }
    }

    /// Tracks how many generate calls overlap
    struct CountingGenerator {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl CountingGenerator {
        fn new() -> Self {
            CountingGenerator {
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Generator for CountingGenerator {
        async fn generate(
            &self,
            _instruction: &str,
            _history: &[Turn],
            _user_text: &str,
            _request_id: Uuid,
        ) -> Result<String> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(10)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok("done".to_string())
        }
    }

    fn engine_with(
        generator: Arc<dyn Generator>,
    ) -> (ConversationEngine, Arc<SessionRegistry>) {
        let personas = Arc::new(PersonaStore::new());
        let sessions = Arc::new(SessionRegistry::new(personas, 40));
        (
            ConversationEngine::new(sessions.clone(), generator),
            sessions,
        )
    }

    #[tokio::test]
    async fn test_respond_records_both_turns() {
        let scripted = Arc::new(ScriptedGenerator::new(&["Justice is..."]));
        let (engine, sessions) = engine_with(scripted.clone());

        let reply = engine
            .respond(CHANNEL, "What is justice?", Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(reply, EngineReply::Text("Justice is...".to_string()));

        let session = sessions.get_or_create(CHANNEL).await;
        let guard = session.lock().await;
        assert_eq!(guard.len(), 3);
        assert_eq!(guard.turns()[0].role, Role::System);
        assert_eq!(guard.history()[0].text, "What is justice?");
        assert_eq!(guard.history()[1].text, "Justice is...");

        let calls = scripted.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].instruction.contains("Socrates"));
        assert!(calls[0].history.is_empty());
        assert_eq!(calls[0].user_text, "What is justice?");
    }

    #[tokio::test]
    async fn test_second_turn_sees_prior_exchange() {
        let scripted = Arc::new(ScriptedGenerator::new(&["Justice is...", "Virtue is..."]));
        let (engine, _sessions) = engine_with(scripted.clone());

        engine
            .respond(CHANNEL, "What is justice?", Uuid::new_v4())
            .await
            .unwrap();
        engine
            .respond(CHANNEL, "And what of virtue?", Uuid::new_v4())
            .await
            .unwrap();

        let calls = scripted.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].history.len(), 2);
        assert_eq!(calls[1].history[0].role, Role::User);
        assert_eq!(calls[1].history[0].text, "What is justice?");
        assert_eq!(calls[1].history[1].role, Role::Assistant);
        assert_eq!(calls[1].history[1].text, "Justice is...");
        assert_eq!(calls[1].user_text, "And what of virtue?");
    }

    #[tokio::test]
    async fn test_generation_failure_discards_session() {
        let (engine, sessions) = engine_with(Arc::new(FailingGenerator));

        let result = engine
            .respond(CHANNEL, "What is justice?", Uuid::new_v4())
            .await;
        assert!(result.is_err());
        assert_eq!(sessions.len(), 0);
    }

    #[tokio::test]
    async fn test_empty_completion_keeps_session() {
        let (engine, sessions) = engine_with(Arc::new(EmptyGenerator));

        let reply = engine
            .respond(CHANNEL, "What is justice?", Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(reply, EngineReply::Empty);
        assert_eq!(sessions.len(), 1);

        let session = sessions.get_or_create(CHANNEL).await;
        let guard = session.lock().await;
        assert_eq!(guard.len(), 2);
        assert_eq!(guard.history()[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_same_channel_requests_are_serialized() {
        let counting = Arc::new(CountingGenerator::new());
        let (engine, _sessions) = engine_with(counting.clone());
        let engine = Arc::new(engine);

        let a = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.respond(CHANNEL, "first", Uuid::new_v4()).await })
        };
        let b = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.respond(CHANNEL, "second", Uuid::new_v4()).await })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(counting.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_channels_run_independently() {
        let counting = Arc::new(CountingGenerator::new());
        let (engine, _sessions) = engine_with(counting.clone());
        let engine = Arc::new(engine);

        let a = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.respond(CHANNEL, "first", Uuid::new_v4()).await })
        };
        let b = {
            let engine = engine.clone();
            tokio::spawn(
                async move { engine.respond(OTHER_CHANNEL, "second", Uuid::new_v4()).await },
            )
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(counting.peak.load(Ordering::SeqCst), 2);
    }
}
