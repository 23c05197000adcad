//! UI-agnostic chat state types
//!
//! These structures are shared by every front end and double as the wire
//! format of the `history` field sent to the transform endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }
}

/// One message in the conversation, timestamped locally when recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            personality: None,
        }
    }

    pub fn ai(content: impl Into<String>, personality: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: Sender::Ai,
            timestamp: Utc::now(),
            personality: Some(personality.into()),
        }
    }
}

/// Append-only, insertion-ordered log of chat turns.
///
/// Only the owning session can push; everyone else sees a slice.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, turn: ChatTurn) -> &ChatTurn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Every turn except the most recent one
    pub fn before_last(&self) -> &[ChatTurn] {
        let end = self.turns.len().saturating_sub(1);
        &self.turns[..end]
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
