//! Session configuration

use std::time::Duration;

use shakmaty::Color;

/// Timings and sides for a coaching session.
///
/// The delays are cosmetic pacing; correctness never depends on them.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Side the automated opponent plays.
    pub automated_side: Color,

    /// Pause before a move's commentary is appended to the chat.
    pub commentary_delay: Duration,

    /// Pause before the automated side answers with its own move.
    pub opponent_delay: Duration,

    /// Pause before the placeholder reply to a chat message.
    pub chat_reply_delay: Duration,

    /// How long a clicked token's highlight stays on the board.
    pub highlight_duration: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            automated_side: Color::Black,
            commentary_delay: Duration::from_millis(400),
            opponent_delay: Duration::from_millis(500),
            chat_reply_delay: Duration::from_millis(800),
            highlight_duration: Duration::from_millis(2000),
        }
    }
}
