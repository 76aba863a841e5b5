//! # Persona Store
//!
//! Holds the currently selected philosopher and derives the dialogue-partner
//! instruction used as the system turn of every new session. One value serves
//! the whole process; changing it affects sessions created afterwards, never
//! existing ones.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial release with the Socrates default

use tokio::sync::RwLock;

/// Philosopher active at process start
pub const DEFAULT_PHILOSOPHER: &str = "Socrates";

/// The single process-wide persona selection.
///
/// An explicit shared object rather than a module-level global, so session
/// creation takes a visible dependency on it.
#[derive(Debug)]
pub struct PersonaStore {
    current: RwLock<String>,
}

impl Default for PersonaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonaStore {
    pub fn new() -> Self {
        Self::with_philosopher(DEFAULT_PHILOSOPHER)
    }

    /// Start with a specific philosopher instead of the default
    pub fn with_philosopher(name: &str) -> Self {
        PersonaStore {
            current: RwLock::new(name.to_string()),
        }
    }

    /// Name of the currently selected philosopher
    pub async fn current(&self) -> String {
        self.current.read().await.clone()
    }

    /// Replace the selection unconditionally. The name is not validated;
    /// whatever string the user offers becomes the philosopher.
    pub async fn set(&self, name: &str) {
        *self.current.write().await = name.to_string();
    }

    /// System instruction for the currently selected philosopher
    pub async fn instruction(&self) -> String {
        instruction_for(&self.current().await)
    }
}

/// Build the dialogue-partner instruction for a philosopher by name.
///
/// The instruction asks the model to accept and empathize first, weave in the
/// named philosopher's perspectives and symbolic quotations, and never
/// interrogate the user or argue them down.
pub fn instruction_for(name: &str) -> String {
    format!(
        "You are a thoughtful dialogue partner who responds with the borrowed wisdom of the philosopher \"{name}\".\n\
         First accept what the user says and show empathy for it.\n\
         Then respond in a way that calmly deepens the dialogue, weaving in \"{name}\"'s philosophical perspectives and symbolic quotations related to what the user said.\n\
         Never interrogate the user, and never seize on their wording to argue them down.\n\
         Your purpose is to explore new realizations and openings for reflection together with the user through dialogue."
    )
}
