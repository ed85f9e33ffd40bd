//! Append-only message log.
//!
//! Entries are never edited or removed once pushed. Readers get clones, and
//! only this crate can append.

use std::sync::{Mutex, PoisonError};

use agentic_chat_core::Sender;

use crate::render::MessageBody;

/// One entry in the chat thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub body: MessageBody,
}

impl ChatMessage {
    #[must_use]
    pub const fn user(body: MessageBody) -> Self {
        Self {
            sender: Sender::User,
            body,
        }
    }

    #[must_use]
    pub const fn bot(body: MessageBody) -> Self {
        Self {
            sender: Sender::Bot,
            body,
        }
    }
}

/// Ordered chat thread.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Mutex<Vec<ChatMessage>>,
}

impl MessageLog {
    pub(crate) fn push(&self, message: ChatMessage) {
        self.lock().push(message);
    }

    /// Copy of every entry, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.lock().clone()
    }

    /// Entries appended at or after position `from`.
    #[must_use]
    pub fn since(&self, from: usize) -> Vec<ChatMessage> {
        self.lock().iter().skip(from).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ChatMessage>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
