//! Chat transcript with per-turn typing placeholders.
//!
//! DESIGN
//! ======
//! Each user turn mints a `TurnId`. The turn's placeholder carries that id,
//! and resolving the turn removes exactly that placeholder before appending
//! the bot replies in the same call. Turns can overlap freely; a turn whose
//! placeholder is already gone (history cleared) resolves to nothing.

use std::fmt;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::lang::Language;

/// Identifier of one user → bot exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TurnId(Uuid);

impl TurnId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: OffsetDateTime,
    pub language: Option<Language>,
    /// Set only on typing placeholders.
    pub pending: Option<TurnId>,
}

impl ChatMessage {
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.pending.is_some()
    }
}

/// Append-only chat history, cleared only by explicit user action.
#[derive(Clone, Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn push_user(&mut self, text: impl Into<String>, language: Language, timestamp: OffsetDateTime) -> Uuid {
        let id = Uuid::new_v4();
        self.messages.push(ChatMessage {
            id,
            text: text.into(),
            sender: Sender::User,
            timestamp,
            language: Some(language),
            pending: None,
        });
        id
    }

    /// Insert the typing indicator for `turn`. At most one exists per turn.
    pub fn push_placeholder(&mut self, turn: TurnId, timestamp: OffsetDateTime) {
        if self.has_placeholder(turn) {
            return;
        }
        self.messages.push(ChatMessage {
            id: Uuid::new_v4(),
            text: String::new(),
            sender: Sender::Bot,
            timestamp,
            language: None,
            pending: Some(turn),
        });
    }

    /// Swap `turn`'s placeholder for `replies`.
    ///
    /// Returns `false` (and appends nothing) when the placeholder is gone.
    pub fn resolve(&mut self, turn: TurnId, replies: Vec<String>, timestamp: OffsetDateTime) -> bool {
        let Some(pos) = self.messages.iter().position(|m| m.pending == Some(turn)) else {
            return false;
        };
        self.messages.remove(pos);
        self.messages.extend(replies.into_iter().map(|text| ChatMessage {
            id: Uuid::new_v4(),
            text,
            sender: Sender::Bot,
            timestamp,
            language: None,
            pending: None,
        }));
        true
    }

    #[must_use]
    pub fn has_placeholder(&self, turn: TurnId) -> bool {
        self.messages.iter().any(|m| m.pending == Some(turn))
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_placeholder()).count()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;
