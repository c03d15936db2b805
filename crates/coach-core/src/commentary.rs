//! Canned coach commentary for played moves.

use shakmaty::Role;

use crate::rules::MoveRecord;

/// Commentary for one applied move. Deterministic: the same record always
/// produces the same text.
///
/// Pawn moves get the pawn template, everything else names the piece and
/// its destination. Capture and check clauses are appended in that order;
/// checkmate replaces the check clause.
pub fn move_commentary(record: &MoveRecord) -> String {
    let mut text = if record.role == Role::Pawn {
        format!(
            "And it's {}! The pawn advances, putting pressure on the board.",
            record.san
        )
    } else {
        format!(
            "A bold move: {} to {}. Let's see how the opponent responds!",
            piece_label(record.role),
            record.to
        )
    };
    if record.is_capture() {
        text.push_str(&format!(" Captures on {}!", record.to));
    }
    if record.is_checkmate() {
        text.push_str(" Checkmate! What a finish!");
    } else if record.is_check() {
        text.push_str(" Check! The king is under threat.");
    }
    text
}

fn piece_label(role: Role) -> &'static str {
    match role {
        Role::Pawn => "Pawn",
        Role::Knight => "Knight",
        Role::Bishop => "Bishop",
        Role::Rook => "Rook",
        Role::Queen => "Queen",
        Role::King => "King",
    }
}
