use recon_core::{Color, Square, flipped_for};
use std::time::Duration;

/// Tunable constants for the sense and move heuristics.
///
/// Candidate squares are authored from White's side of the board and mirrored
/// when the agent plays Black.
#[derive(Debug, Clone, PartialEq)]
pub struct BotParams {
    /// Consecutive proposals of one king target before giving up on it (default: 2)
    pub king_visit_threshold: u32,

    /// Oracle budget for the real move decision (default: 1s)
    pub move_time: Duration,

    /// Oracle budget for the capture preview made while sensing (default: 0.5s)
    pub preview_time: Duration,

    /// Where the opponent king is assumed to start (default: e7)
    pub default_king_square: Square,

    /// Squares probed while the opponent king is lost (default: b7, d7, f7)
    pub king_flight_squares: [Square; 3],

    /// Last-resort sense targets (default: b5, d5, f5)
    pub center_squares: [Square; 3],

    /// Fixed RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            king_visit_threshold: 2,
            move_time: Duration::from_secs(1),
            preview_time: Duration::from_millis(500),
            default_king_square: Square::E7,
            king_flight_squares: [Square::B7, Square::D7, Square::F7],
            center_squares: [Square::B5, Square::D5, Square::F5],
            seed: None,
        }
    }
}

impl BotParams {
    /// Faster tuning: one visit per king target and half the oracle budget.
    pub fn conservative() -> Self {
        Self {
            king_visit_threshold: 1,
            move_time: Duration::from_millis(500),
            preview_time: Duration::from_millis(250),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn default_king_for(&self, color: Color) -> Square {
        flipped_for(color, self.default_king_square)
    }

    pub fn king_flight_for(&self, color: Color) -> [Square; 3] {
        self.king_flight_squares
            .map(|square| flipped_for(color, square))
    }

    pub fn center_for(&self, color: Color) -> [Square; 3] {
        self.center_squares.map(|square| flipped_for(color, square))
    }
}
