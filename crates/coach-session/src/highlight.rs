//! Board highlight state: which squares light up after a notation click,
//! and the timer that clears them again.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use shakmaty::Square;
use tokio::task::JoinHandle;
use tracing::debug;

use coach_core::rules::RulesEngine;

/// Squares to paint for a resolved notation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightTargets {
    /// Square the move starts from.
    pub origin: Square,
    /// Square the move lands on.
    pub destination: Square,
}

/// An active highlight: the clicked notation, the position it was resolved
/// against, and the squares to paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSelection {
    pub notation: String,
    pub preceding_fen: String,
    pub targets: HighlightTargets,
}

struct ActiveHighlight {
    selection: HighlightSelection,
    timer: JoinHandle<()>,
}

struct Inner {
    epoch: u64,
    active: Option<ActiveHighlight>,
}

/// Idle/active highlight state with a last-click-wins expiry timer.
///
/// Activating a new selection replaces the current one and restarts the
/// clock; the superseded selection's timer can never clear the new one.
pub struct HighlightController {
    duration: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl HighlightController {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            inner: Arc::new(Mutex::new(Inner {
                epoch: 0,
                active: None,
            })),
        }
    }

    /// Make `selection` the active highlight and start its expiry timer.
    pub fn activate(&self, selection: HighlightSelection) {
        let mut inner = self.inner.lock().unwrap();
        inner.epoch += 1;
        let epoch = inner.epoch;
        if let Some(previous) = inner.active.take() {
            previous.timer.abort();
        }

        let shared = Arc::clone(&self.inner);
        let duration = self.duration;
        // The epoch check makes a timer that already fired for a superseded
        // selection a no-op.
        let timer = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut inner = shared.lock().unwrap();
            if inner.epoch == epoch {
                inner.active = None;
            }
        });

        inner.active = Some(ActiveHighlight { selection, timer });
    }

    /// The active selection, or `None` when idle.
    pub fn current(&self) -> Option<HighlightSelection> {
        let inner = self.inner.lock().unwrap();
        inner.active.as_ref().map(|active| active.selection.clone())
    }
}

impl Drop for HighlightController {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(active) = inner.active.take() {
                active.timer.abort();
            }
        }
    }
}

/// Resolve a clicked token against the position its message was written
/// about: the token must equal a legal move's canonical SAN exactly.
///
/// An unparsable FEN or a token that matches no legal move resolves to
/// `None`; both are ordinary outcomes, not errors.
pub fn resolve_notation<E: RulesEngine>(
    engine: &E,
    preceding_fen: &str,
    notation: &str,
) -> Option<HighlightTargets> {
    let position = match engine.position_from_fen(preceding_fen) {
        Ok(position) => position,
        Err(err) => {
            debug!(error = %err, "token ignored: bad preceding position");
            return None;
        }
    };
    let targets = engine
        .legal_moves(&position)
        .into_iter()
        .find(|record| record.san == notation)
        .map(|record| HighlightTargets {
            origin: record.from,
            destination: record.to,
        });
    if targets.is_none() {
        debug!(notation = %notation, "token ignored: no matching legal move");
    }
    targets
}
