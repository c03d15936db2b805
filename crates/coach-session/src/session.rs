//! The coaching session: one board, one chat log, and an automated opponent
//! that answers the human's moves.

use std::sync::Arc;

use shakmaty::{Color, Square};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, info};

use coach_core::commentary;
use coach_core::opponent;
use coach_core::rules::{MoveRecord, RulesEngine, ShakmatyRules};

use crate::chat::ChatMessage;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::highlight::{resolve_notation, HighlightController, HighlightSelection, HighlightTargets};

/// A single human-vs-automated coaching game.
///
/// Move application is synchronous and strictly ordered; commentary, the
/// automated reply, and chat answers arrive later from one background task
/// per trigger. Dropping the session aborts everything still pending.
pub struct CoachSession<E: RulesEngine> {
    engine: Arc<E>,
    config: SessionConfig,
    state: Arc<Mutex<GameState<E>>>,
    highlight: HighlightController,
    tasks: std::sync::Mutex<JoinSet<()>>,
}

struct GameState<E: RulesEngine> {
    position: E::Position,
    messages: Vec<ChatMessage>,
}

impl<E: RulesEngine + 'static> CoachSession<E> {
    /// New session from the standard starting position.
    pub fn new(engine: E, config: SessionConfig) -> Self {
        let position = engine.starting_position();
        Self::with_position(engine, config, position)
    }

    /// New session from a saved position.
    pub fn from_fen(engine: E, config: SessionConfig, fen: &str) -> Result<Self, SessionError> {
        let position = engine.position_from_fen(fen)?;
        Ok(Self::with_position(engine, config, position))
    }

    fn with_position(engine: E, config: SessionConfig, position: E::Position) -> Self {
        Self {
            highlight: HighlightController::new(config.highlight_duration),
            engine: Arc::new(engine),
            config,
            state: Arc::new(Mutex::new(GameState {
                position,
                messages: greeting_messages(),
            })),
            tasks: std::sync::Mutex::new(JoinSet::new()),
        }
    }

    /// Validate and apply a human move, then schedule its commentary and
    /// the automated side's reply.
    ///
    /// Promotions are resolved to a queen. A rejected move changes nothing
    /// and schedules nothing; the error's message is the notice to show.
    pub async fn play_move(&self, from: Square, to: Square) -> Result<MoveRecord, SessionError> {
        let (record, fen_before) = {
            let mut state = self.state.lock().await;
            let fen_before = self.engine.fen(&state.position);
            let (record, next) = self.engine.apply_move(&state.position, from, to, None)?;
            state.position = next;
            (record, fen_before)
        };
        info!(san = %record.san, "move played");
        self.spawn_followup(record.clone(), fen_before);
        Ok(record)
    }

    /// Append a human chat message and schedule the placeholder reply.
    /// Whitespace-only input is dropped.
    pub async fn send_chat(&self, text: &str) {
        if text.trim().is_empty() {
            debug!("ignoring empty chat message");
            return;
        }
        {
            let mut state = self.state.lock().await;
            state.messages.push(ChatMessage::human(text));
        }

        let state = Arc::clone(&self.state);
        let delay = self.config.chat_reply_delay;
        let prompt = text.to_string();
        self.spawn(async move {
            sleep(delay).await;
            let mut state = state.lock().await;
            state
                .messages
                .push(ChatMessage::coach(format!(
                    "(AI reasoning placeholder for: {prompt})"
                )));
        });
    }

    /// Resolve a clicked notation token and light up its squares.
    ///
    /// A token that does not resolve is ignored; whatever highlight was
    /// active before stays active until its own expiry.
    pub fn token_click(&self, notation: &str, preceding_fen: &str) -> Option<HighlightTargets> {
        let targets = resolve_notation(self.engine.as_ref(), preceding_fen, notation)?;
        self.highlight.activate(HighlightSelection {
            notation: notation.to_string(),
            preceding_fen: preceding_fen.to_string(),
            targets,
        });
        Some(targets)
    }

    /// The active board highlight, or `None` when idle.
    pub fn active_highlight(&self) -> Option<HighlightSelection> {
        self.highlight.current()
    }

    pub async fn fen(&self) -> String {
        let state = self.state.lock().await;
        self.engine.fen(&state.position)
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().await.messages.clone()
    }

    pub async fn side_to_move(&self) -> Color {
        let state = self.state.lock().await;
        self.engine.side_to_move(&state.position)
    }

    pub async fn is_game_over(&self) -> bool {
        let state = self.state.lock().await;
        self.engine.is_game_over(&state.position)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// One background flow per played move: commentary for the move, then
    /// the automated reply and its commentary. Running the steps in one
    /// task keeps chat order matching move order regardless of timing.
    fn spawn_followup(&self, record: MoveRecord, fen_before: String) {
        let engine = Arc::clone(&self.engine);
        let state = Arc::clone(&self.state);
        let config = self.config.clone();
        self.spawn(async move {
            sleep(config.commentary_delay).await;
            {
                let mut state = state.lock().await;
                let text = commentary::move_commentary(&record);
                state.messages.push(ChatMessage::commentary(text, fen_before));
            }

            sleep(config.opponent_delay).await;
            let (reply, reply_fen) = {
                let mut state = state.lock().await;
                if engine.side_to_move(&state.position) != config.automated_side
                    || engine.is_game_over(&state.position)
                {
                    debug!("no automated reply for this position");
                    return;
                }
                let fen_before = engine.fen(&state.position);
                let mut rng = rand::rng();
                match opponent::play_random_move(engine.as_ref(), &state.position, &mut rng) {
                    Some((reply, next)) => {
                        state.position = next;
                        (reply, fen_before)
                    }
                    None => return,
                }
            };
            info!(san = %reply.san, "automated reply played");

            sleep(config.commentary_delay).await;
            let mut state = state.lock().await;
            let text = commentary::move_commentary(&reply);
            state.messages.push(ChatMessage::commentary(text, reply_fen));
        });
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap();
        // Reap finished handles so the set does not grow with every move.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }
}

impl CoachSession<ShakmatyRules> {
    /// Session with the bundled shakmaty rules and standard timings.
    pub fn standard() -> Self {
        Self::new(ShakmatyRules, SessionConfig::default())
    }
}

/// Opening exchange shown before any move is played.
fn greeting_messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::coach("I played e5 to control the center and open lines for my pieces."),
        ChatMessage::human("Why not knight to f6 instead?"),
        ChatMessage::coach(
            "Playing Nf6 is also possible, but e5 is more classical and flexible at this stage.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::MessageRole;
    use coach_core::rules::STARTING_FEN;
    use shakmaty::Role;
    use std::time::Duration;

    fn session() -> CoachSession<ShakmatyRules> {
        CoachSession::standard()
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_starts_with_greeting() {
        let session = session();
        assert_eq!(session.fen().await, STARTING_FEN);
        assert_eq!(session.side_to_move().await, Color::White);
        let messages = session.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, MessageRole::Coach);
        assert_eq!(messages[1].role, MessageRole::Human);
        assert!(messages.iter().all(|m| m.preceding_fen.is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_move_applies_and_flips_turn() {
        let session = session();
        let record = session.play_move(Square::E2, Square::E4).await.unwrap();
        assert_eq!(record.san, "e4");
        assert_eq!(session.side_to_move().await, Color::Black);
    }

    #[tokio::test(start_paused = true)]
    async fn test_illegal_move_changes_nothing() {
        let session = session();
        let before = session.fen().await;
        let seeded = session.messages().await.len();

        let err = session.play_move(Square::E2, Square::E5).await.unwrap_err();
        assert_eq!(err.to_string(), "You cannot move from e2 to e5.");

        sleep(Duration::from_millis(3000)).await;
        assert_eq!(session.fen().await, before);
        assert_eq!(session.messages().await.len(), seeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_followup_appends_commentary_then_reply() {
        let session = session();
        let seeded = session.messages().await.len();
        session.play_move(Square::E2, Square::E4).await.unwrap();

        // Commentary for the human move first.
        sleep(Duration::from_millis(450)).await;
        let messages = session.messages().await;
        assert_eq!(messages.len(), seeded + 1);
        let commentary = &messages[seeded];
        assert_eq!(commentary.role, MessageRole::Coach);
        assert!(commentary.text.contains("e4"));
        assert_eq!(commentary.preceding_fen.as_deref(), Some(STARTING_FEN));
        // The opponent has not answered yet.
        assert_eq!(session.side_to_move().await, Color::Black);

        // Then the automated reply and its commentary, in order.
        sleep(Duration::from_millis(1000)).await;
        let messages = session.messages().await;
        assert_eq!(messages.len(), seeded + 2);
        assert_eq!(messages[seeded + 1].role, MessageRole::Coach);
        assert!(messages[seeded + 1].preceding_fen.is_some());
        assert_eq!(session.side_to_move().await, Color::White);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_commentary_records_its_own_position() {
        let session = session();
        let seeded = session.messages().await.len();
        session.play_move(Square::E2, Square::E4).await.unwrap();

        let engine = ShakmatyRules;
        let start = engine.starting_position();
        let (_, after_e4) = engine
            .apply_move(&start, Square::E2, Square::E4, None)
            .unwrap();

        sleep(Duration::from_millis(1500)).await;
        let messages = session.messages().await;
        assert_eq!(
            messages[seeded + 1].preceding_fen.as_deref(),
            Some(engine.fen(&after_e4).as_str())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_human_move_waits_for_reply() {
        let session = session();
        session.play_move(Square::E2, Square::E4).await.unwrap();

        // Black is to move while the follow-up is pending.
        let err = session.play_move(Square::D2, Square::D4).await.unwrap_err();
        assert!(matches!(err, SessionError::IllegalMove { .. }));

        // After the reply the human may move again.
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(session.side_to_move().await, Color::White);
        session.play_move(Square::D2, Square::D4).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_mating_move_gets_commentary_but_no_reply() {
        let session = CoachSession::from_fen(
            ShakmatyRules,
            SessionConfig::default(),
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        )
        .unwrap();
        let seeded = session.messages().await.len();

        let record = session.play_move(Square::H5, Square::F7).await.unwrap();
        assert_eq!(record.san, "Qxf7#");
        assert!(session.is_game_over().await);

        sleep(Duration::from_millis(3000)).await;
        let messages = session.messages().await;
        assert_eq!(messages.len(), seeded + 1);
        assert!(messages[seeded].text.contains("Checkmate! What a finish!"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_promotion_defaults_to_queen() {
        let session = CoachSession::from_fen(
            ShakmatyRules,
            SessionConfig::default(),
            "8/P5k1/8/8/8/8/8/4K3 w - - 0 1",
        )
        .unwrap();
        let record = session.play_move(Square::A7, Square::A8).await.unwrap();
        assert_eq!(record.san, "a8=Q");
        assert_eq!(record.promotion, Some(Role::Queen));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_reply_echoes_prompt() {
        let session = session();
        let seeded = session.messages().await.len();

        session.send_chat("What is the best move now?").await;
        let messages = session.messages().await;
        assert_eq!(messages.len(), seeded + 1);
        assert_eq!(messages[seeded].role, MessageRole::Human);
        assert_eq!(messages[seeded].text, "What is the best move now?");

        sleep(Duration::from_millis(850)).await;
        let messages = session.messages().await;
        assert_eq!(messages.len(), seeded + 2);
        assert_eq!(
            messages[seeded + 1].text,
            "(AI reasoning placeholder for: What is the best move now?)"
        );
        assert_eq!(messages[seeded + 1].role, MessageRole::Coach);
        assert!(messages[seeded + 1].preceding_fen.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_chat_is_dropped() {
        let session = session();
        let seeded = session.messages().await.len();
        session.send_chat("   ").await;
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(session.messages().await.len(), seeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_click_highlights_and_expires() {
        let session = session();
        let targets = session.token_click("e4", STARTING_FEN).unwrap();
        assert_eq!(targets.origin, Square::E2);
        assert_eq!(targets.destination, Square::E4);
        assert!(session.active_highlight().is_some());

        sleep(Duration::from_millis(2100)).await;
        assert!(session.active_highlight().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolvable_click_keeps_previous_highlight() {
        let session = session();
        session.token_click("e4", STARTING_FEN).unwrap();
        assert!(session.token_click("e5", STARTING_FEN).is_none());
        let active = session.active_highlight().unwrap();
        assert_eq!(active.notation, "e4");
    }
}
