//! Per-session conversation history.
//!
//! A session keeps the last `max_history` exchanges and renders them as the
//! prior-conversation summary handed to the generator.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{debug, warn};

use crate::llm::Role;

/// One recorded message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    fn label(&self) -> &'static str {
        match self.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// Thread-safe store of session histories.
///
/// Sessions live as long as the manager; nothing is evicted, only each
/// session's history is bounded.
pub struct SessionManager {
    max_history: usize,
    counter: AtomicU64,
    sessions: Mutex<HashMap<String, Vec<Message>>>,
}

impl SessionManager {
    /// Keep at most `max_history` exchanges (two messages each) per session.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            counter: AtomicU64::new(0),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The session map, recovered if a panicking holder poisoned the lock.
    /// Every mutation leaves the map consistent, so the data is still valid.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Message>>> {
        self.sessions.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("Session store lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Start an empty session and return its id (`session_1`, `session_2`, …).
    pub fn create_session(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("session_{n}");
        self.lock().insert(id.clone(), Vec::new());
        debug!(session = %id, "Created session");
        id
    }

    /// Append one message, creating the session if it is unknown.
    pub fn add_message(&self, session_id: &str, role: Role, content: impl Into<String>) {
        let mut sessions = self.lock();
        let messages = sessions.entry(session_id.to_string()).or_default();
        messages.push(Message {
            role,
            content: content.into(),
        });
        let keep = self.max_history * 2;
        if messages.len() > keep {
            let excess = messages.len() - keep;
            messages.drain(..excess);
        }
    }

    /// Record a question and its answer.
    pub fn add_exchange(&self, session_id: &str, question: &str, answer: &str) {
        self.add_message(session_id, Role::User, question);
        self.add_message(session_id, Role::Assistant, answer);
    }

    /// The session's history as `User: …` / `Assistant: …` lines, or `None`
    /// when the session is unknown or empty.
    pub fn history(&self, session_id: &str) -> Option<String> {
        let sessions = self.lock();
        let messages = sessions.get(session_id)?;
        if messages.is_empty() {
            return None;
        }
        Some(
            messages
                .iter()
                .map(|m| format!("{}: {}", m.label(), m.content))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    pub fn messages(&self, session_id: &str) -> Vec<Message> {
        self.lock().get(session_id).cloned().unwrap_or_default()
    }

    /// Forget everything recorded for a session. The id stays valid.
    pub fn clear(&self, session_id: &str) {
        if let Some(messages) = self.lock().get_mut(session_id) {
            messages.clear();
        }
    }
}
