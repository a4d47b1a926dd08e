//! Chat session controller.
//!
//! DESIGN
//! ======
//! A turn is three store writes: the user message and the typing
//! placeholder go in together before the request is sent, and the
//! placeholder is swapped for the replies in one write when it resolves.
//! Turns may overlap; each one only ever touches its own placeholder.

use time::OffsetDateTime;
use tracing::{debug, warn};

use super::Dashboard;
use crate::lang::{Language, detect_language};
use crate::net::error::ApiError;
use crate::net::types::ChatReply;
use crate::state::chat::TurnId;

/// Bot reply when the backend answers with no items.
pub const EMPTY_REPLY: &str = "Sorry, I could not process your message.";

/// Bot reply when the chat request fails.
pub const ERROR_REPLY: &str = "Sorry, there was an error processing your message.";

/// What happened to one submitted turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnOutcome {
    pub turn: TurnId,
    pub language: Language,
    /// Bot texts appended for this turn.
    pub replies: Vec<String>,
    pub error: Option<ApiError>,
    /// `false` when the history was cleared before the reply arrived.
    pub delivered: bool,
}

impl Dashboard {
    /// Submit one user message. Blank input is ignored and returns `None`.
    pub async fn send_chat(&self, message: &str) -> Option<TurnOutcome> {
        let text = message.trim();
        if text.is_empty() {
            return None;
        }

        let language = detect_language(text);
        let turn = TurnId::new();
        let sent_at = OffsetDateTime::now_utc();
        self.store().update(|s| {
            s.chat.push_user(text, language, sent_at);
            s.chat.push_placeholder(turn, sent_at);
        });
        debug!(%turn, %language, "chat turn started");

        let (replies, error) = match self.backend.chat(text, language).await {
            Ok(items) if items.is_empty() => (vec![EMPTY_REPLY.to_owned()], None),
            Ok(items) => (items.iter().map(ChatReply::display_text).collect(), None),
            Err(e) => {
                warn!(%turn, error = %e, "chat request failed");
                (vec![ERROR_REPLY.to_owned()], Some(e))
            }
        };

        let answered_at = OffsetDateTime::now_utc();
        let delivered = self
            .store()
            .update(|s| s.chat.resolve(turn, replies.clone(), answered_at));
        if !delivered {
            debug!(%turn, "chat history cleared before reply; dropping it");
        }

        Some(TurnOutcome { turn, language, replies, error, delivered })
    }

    /// Empty the chat history. Replies still in flight are dropped on arrival.
    pub fn clear_chat(&self) {
        self.store().update(|s| s.chat.clear());
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;
