//! Random move selection for the automated side.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::rules::{MoveRecord, RulesEngine};

/// Pick a legal move uniformly at random and apply it.
///
/// Each promotion piece counts as its own candidate, like any other move.
/// Returns `None` when the position has no legal moves.
pub fn play_random_move<E, R>(
    engine: &E,
    position: &E::Position,
    rng: &mut R,
) -> Option<(MoveRecord, E::Position)>
where
    E: RulesEngine,
    R: Rng + ?Sized,
{
    let legal = engine.legal_moves(position);
    let candidate = legal.choose(rng)?;
    engine
        .apply_move(position, candidate.from, candidate.to, candidate.promotion)
        .ok()
}
