use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prompt suggestions offered above the chat input.
pub const SUGGESTED_PROMPTS: [&str; 5] = [
    "What was your last move and why?",
    "What is the best move now?",
    "Can you explain this opening?",
    "What are the threats in this position?",
    "How can I improve my position?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    Human,
    Coach,
}

/// One entry in the session's chat log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub text: String,
    /// FEN of the position immediately before the move this message
    /// describes. `None` for plain conversation.
    pub preceding_fen: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn human(text: impl Into<String>) -> Self {
        Self::build(MessageRole::Human, text.into(), None)
    }

    pub fn coach(text: impl Into<String>) -> Self {
        Self::build(MessageRole::Coach, text.into(), None)
    }

    /// Coach commentary about a move. Always records the position the move
    /// was played from, so notation tokens in the text can be resolved
    /// later, after the board has moved on.
    pub fn commentary(text: impl Into<String>, preceding_fen: impl Into<String>) -> Self {
        Self::build(MessageRole::Coach, text.into(), Some(preceding_fen.into()))
    }

    fn build(role: MessageRole, text: String, preceding_fen: Option<String>) -> Self {
        Self {
            role,
            text,
            preceding_fen,
            sent_at: Utc::now(),
        }
    }
}
