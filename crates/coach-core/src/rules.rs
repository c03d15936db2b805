//! Move legality and notation, behind a narrow engine trait.
//!
//! The rest of the workspace never touches a chess library directly; it asks
//! a [`RulesEngine`] for legal moves and applies them by square pair.

use shakmaty::{
    fen::Fen, san::San, CastlingMode, Chess, Color, EnPassantMode, File, Move, Position, Role,
    Square,
};
use thiserror::Error;

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Illegal move from {from} to {to}")]
    IllegalMove { from: Square, to: Square },

    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
}

/// One applied (or applicable) move, described in vocabulary the UI layers
/// can render without consulting the engine again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// Piece that moved.
    pub role: Role,
    /// Square the piece left. For castling this is the king's square.
    pub from: Square,
    /// Square the piece landed on. For castling this is the king's
    /// destination, not the rook's square.
    pub to: Square,
    /// Role of the captured piece, if any. En passant counts as a capture.
    pub capture: Option<Role>,
    /// Promotion piece, if the move promotes.
    pub promotion: Option<Role>,
    pub is_castle: bool,
    /// Canonical SAN, including a trailing `+` or `#` when the move gives
    /// check or mate.
    pub san: String,
}

impl MoveRecord {
    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    pub fn is_check(&self) -> bool {
        self.san.ends_with('+') || self.san.ends_with('#')
    }

    pub fn is_checkmate(&self) -> bool {
        self.san.ends_with('#')
    }
}

/// The narrow interface the session and highlight layers depend on.
pub trait RulesEngine: Send + Sync {
    type Position: Clone + Send + Sync + 'static;

    fn starting_position(&self) -> Self::Position;

    fn position_from_fen(&self, fen: &str) -> Result<Self::Position, RulesError>;

    fn fen(&self, position: &Self::Position) -> String;

    fn side_to_move(&self, position: &Self::Position) -> Color;

    fn is_game_over(&self, position: &Self::Position) -> bool;

    /// Every legal move in `position`, with canonical SAN. Promotions appear
    /// once per promotion piece.
    fn legal_moves(&self, position: &Self::Position) -> Vec<MoveRecord>;

    /// Validate and apply the move `from` -> `to`. A promotion without a
    /// hint resolves to a queen.
    fn apply_move(
        &self,
        position: &Self::Position,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Result<(MoveRecord, Self::Position), RulesError>;
}

/// [`RulesEngine`] backed by shakmaty's standard-chess rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyRules;

impl RulesEngine for ShakmatyRules {
    type Position = Chess;

    fn starting_position(&self) -> Chess {
        Chess::default()
    }

    fn position_from_fen(&self, fen: &str) -> Result<Chess, RulesError> {
        let fen: Fen = fen
            .parse()
            .map_err(|err| RulesError::InvalidFen(format!("{err}")))?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|err| RulesError::InvalidFen(format!("{err}")))
    }

    fn fen(&self, position: &Chess) -> String {
        Fen::from_position(position, EnPassantMode::Legal).to_string()
    }

    fn side_to_move(&self, position: &Chess) -> Color {
        position.turn()
    }

    fn is_game_over(&self, position: &Chess) -> bool {
        position.is_game_over()
    }

    fn legal_moves(&self, position: &Chess) -> Vec<MoveRecord> {
        position
            .legal_moves()
            .iter()
            .map(|m| describe(position, m).0)
            .collect()
    }

    fn apply_move(
        &self,
        position: &Chess,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Result<(MoveRecord, Chess), RulesError> {
        let wanted = promotion.unwrap_or(Role::Queen);
        let legals = position.legal_moves();
        let m = legals
            .iter()
            .find(|m| {
                let (m_from, m_to) = move_squares(m);
                m_from == from && m_to == to && m.promotion().map_or(true, |role| role == wanted)
            })
            .ok_or(RulesError::IllegalMove { from, to })?;
        Ok(describe(position, m))
    }
}

/// Build the record for `m` and the position after it.
fn describe(position: &Chess, m: &Move) -> (MoveRecord, Chess) {
    let san = San::from_move(position, *m);
    let mut after = position.clone();
    after.play_unchecked(*m);
    let san = if after.is_checkmate() {
        format!("{san}#")
    } else if after.is_check() {
        format!("{san}+")
    } else {
        san.to_string()
    };
    let (from, to) = move_squares(m);
    let record = MoveRecord {
        role: m.role(),
        from,
        to,
        capture: m.capture(),
        promotion: m.promotion(),
        is_castle: matches!(m, Move::Castle { .. }),
        san,
    };
    (record, after)
}

/// Origin and destination as the board shows them. Castling is reported as
/// the king's two squares rather than the king-takes-rook encoding.
fn move_squares(m: &Move) -> (Square, Square) {
    match m {
        Move::Castle { king, rook } => {
            let to_file = if rook.file() > king.file() { 6u32 } else { 2u32 };
            (*king, Square::from_coords(File::new(to_file), king.rank()))
        }
        _ => (m.from().unwrap_or(m.to()), m.to()),
    }
}
