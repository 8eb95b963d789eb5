mod agent;

pub use agent::BeliefAgent;

use recon_core::{Board, Color, Move, SenseObservation, Square};

/// Why a game ended, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinReason {
    KingCapture,
    Timeout,
    Resign,
    TurnLimit,
    MoveLimit,
}

/// What the host discloses about a finished game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameHistory {
    pub senses: Vec<Option<Square>>,
    pub taken_moves: Vec<Option<Move>>,
}

/// Lifecycle hooks a host drives, one call at a time, in turn order.
pub trait Player {
    fn handle_game_start(&mut self, color: Color, board: Board);

    fn handle_opponent_move_result(&mut self, captured_my_piece: bool, capture_square: Option<Square>);

    fn choose_sense(
        &mut self,
        sense_actions: &[Square],
        move_actions: &[Move],
        seconds_left: f64,
    ) -> Option<Square>;

    fn handle_sense_result(&mut self, sense_result: &[SenseObservation]);

    fn choose_move(&mut self, move_actions: &[Move], seconds_left: f64) -> Option<Move>;

    fn handle_move_result(
        &mut self,
        requested_move: Option<Move>,
        taken_move: Option<Move>,
        captured_opponent_piece: bool,
        capture_square: Option<Square>,
    );

    fn handle_game_end(
        &mut self,
        winner_color: Option<Color>,
        win_reason: Option<WinReason>,
        game_history: &GameHistory,
    );
}
