//! # Session Registry
//!
//! Per-channel conversation state. Sessions are created lazily on the first
//! message after a reset, seeded with a system turn from the persona store,
//! and dropped on reset or generation failure. Each session sits behind its
//! own async mutex so at most one generation is in flight per channel, and
//! channels never contend with each other.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Bound history growth, dropping the oldest non-system turns
//! - 1.0.0: Initial release with lazy per-channel sessions

use crate::features::personas::PersonaStore;
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry in a session's history
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    fn new(role: Role, text: &str) -> Self {
        Turn {
            role,
            text: text.to_string(),
        }
    }
}

/// Conversation history for one channel.
///
/// The first turn is always the system instruction captured when the session
/// was created. Turns beyond the budget are dropped oldest-first; the seed
/// never is.
#[derive(Debug)]
pub struct ChatSession {
    turns: Vec<Turn>,
    max_turns: usize,
}

impl ChatSession {
    fn seeded(instruction: String, max_turns: usize) -> Self {
        ChatSession {
            turns: vec![Turn {
                role: Role::System,
                text: instruction,
            }],
            max_turns,
        }
    }

    /// The system instruction this session was seeded with
    pub fn instruction(&self) -> &str {
        match self.turns.first() {
            Some(turn) if turn.role == Role::System => &turn.text,
            _ => "",
        }
    }

    /// All turns after the system seed, oldest first
    pub fn history(&self) -> &[Turn] {
        match self.turns.first() {
            Some(turn) if turn.role == Role::System => &self.turns[1..],
            _ => &self.turns,
        }
    }

    /// Full turn sequence including the system seed
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a user turn
    pub fn push_user(&mut self, text: &str) {
        self.push(Role::User, text);
    }

    /// Append an assistant turn. Only called after a non-empty generation.
    pub fn push_assistant(&mut self, text: &str) {
        self.push(Role::Assistant, text);
    }

    fn push(&mut self, role: Role, text: &str) {
        self.turns.push(Turn::new(role, text));
        while self.turns.len() > self.max_turns {
            match self.turns.iter().position(|t| t.role != Role::System) {
                Some(idx) => {
                    self.turns.remove(idx);
                }
                None => break,
            }
        }
    }
}

/// Maps channel ids to their live sessions
pub struct SessionRegistry {
    sessions: DashMap<u64, Arc<Mutex<ChatSession>>>,
    personas: Arc<PersonaStore>,
    max_turns: usize,
}

impl SessionRegistry {
    pub fn new(personas: Arc<PersonaStore>, max_turns: usize) -> Self {
        SessionRegistry {
            sessions: DashMap::new(),
            personas,
            max_turns,
        }
    }

    /// Fetch the live session for a channel, creating one seeded with the
    /// current persona instruction when none exists. Never fails.
    pub async fn get_or_create(&self, channel_id: u64) -> Arc<Mutex<ChatSession>> {
        if let Some(existing) = self.sessions.get(&channel_id) {
            return existing.value().clone();
        }

        let instruction = self.personas.instruction().await;
        self.sessions
            .entry(channel_id)
            .or_insert_with(|| {
                debug!("🌱 Seeding fresh session for channel {channel_id}");
                Arc::new(Mutex::new(ChatSession::seeded(instruction, self.max_turns)))
            })
            .value()
            .clone()
    }

    /// Drop a channel's session, optionally switching the persona first.
    /// Returns whether a session existed.
    ///
    /// Nothing is recreated eagerly: the next `get_or_create` re-seeds with
    /// whatever persona is current at that moment. Sessions in other channels
    /// stay untouched even when the persona changes.
    pub async fn reset(&self, channel_id: u64, new_persona: Option<&str>) -> bool {
        if let Some(name) = new_persona {
            self.personas.set(name).await;
        }
        let existed = self.sessions.remove(&channel_id).is_some();
        debug!("🧹 Reset channel {channel_id} | Session existed: {existed}");
        existed
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
