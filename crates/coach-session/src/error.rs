//! Session error types

use shakmaty::Square;
use thiserror::Error;

use coach_core::rules::RulesError;

/// Errors surfaced to the player. The `IllegalMove` message is shown
/// verbatim as the rejection notice.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("You cannot move from {from} to {to}.")]
    IllegalMove { from: Square, to: Square },

    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}

impl From<RulesError> for SessionError {
    fn from(err: RulesError) -> Self {
        match err {
            RulesError::IllegalMove { from, to } => Self::IllegalMove { from, to },
            RulesError::InvalidFen(message) => Self::InvalidPosition(message),
        }
    }
}
