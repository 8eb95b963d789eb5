use super::{GameHistory, Player, WinReason};
use crate::bot::{BotParams, KingSearch, MovePlanner, SenseContext, SensePlanner};
use crate::oracle::{ConfigError, Oracle, OracleConfig, UciEngine};
use rand::SeedableRng;
use rand::rngs::StdRng;
use recon_core::{Board, BoardModel, Color, Move, SenseObservation, Square};
use tracing::{Level, event};

/// Per-game state; created at game start and dropped at game end.
#[derive(Debug, Clone)]
struct GameState {
    board: BoardModel,
    search: KingSearch,
    captured_square: Option<Square>,
    turn: u32,
}

/// Agent that keeps a belief board, hunts the opponent king with its sense
/// actions and asks an oracle for moves.
pub struct BeliefAgent<O: Oracle> {
    oracle: O,
    params: BotParams,
    rng: StdRng,
    game: Option<GameState>,
}

impl BeliefAgent<UciEngine> {
    /// Launches the engine named by `STOCKFISH_EXECUTABLE`.
    pub fn from_env(params: BotParams) -> Result<Self, ConfigError> {
        let config = OracleConfig::from_env()?;
        Self::with_engine(&config, params)
    }

    pub fn with_engine(config: &OracleConfig, params: BotParams) -> Result<Self, ConfigError> {
        let engine = UciEngine::spawn(config)?;
        Ok(Self::new(engine, params))
    }
}

impl<O: Oracle> BeliefAgent<O> {
    pub fn new(oracle: O, params: BotParams) -> Self {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            oracle,
            params,
            rng,
            game: None,
        }
    }

    pub fn params(&self) -> &BotParams {
        &self.params
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Belief board of the game in progress.
    pub fn board(&self) -> Option<&BoardModel> {
        self.game.as_ref().map(|game| &game.board)
    }

    pub fn king_search(&self) -> Option<&KingSearch> {
        self.game.as_ref().map(|game| &game.search)
    }

    /// Square where the opponent took one of our pieces on its last move.
    pub fn captured_square(&self) -> Option<Square> {
        self.game.as_ref().and_then(|game| game.captured_square)
    }

    fn game_mut(&mut self, hook: &'static str) -> Option<&mut GameState> {
        if self.game.is_none() {
            event!(
                target: "recon_bot::agent",
                Level::WARN,
                hook,
                "hook called outside a game"
            );
        }
        self.game.as_mut()
    }
}

impl<O: Oracle> Player for BeliefAgent<O> {
    fn handle_game_start(&mut self, color: Color, board: Board) {
        event!(
            target: "recon_bot::agent",
            Level::INFO,
            color = ?color,
            "game start"
        );
        self.game = Some(GameState {
            board: BoardModel::new(board, color),
            search: KingSearch::for_color(color, &self.params),
            captured_square: None,
            turn: 0,
        });
    }

    fn handle_opponent_move_result(&mut self, captured_my_piece: bool, capture_square: Option<Square>) {
        let Some(game) = self.game_mut("opponent_move_result") else {
            return;
        };
        game.captured_square = capture_square.filter(|_| captured_my_piece);
        if let Some(square) = game.captured_square {
            event!(
                target: "recon_bot::agent",
                Level::DEBUG,
                square = %square,
                "friendly piece captured"
            );
            game.board.apply_opponent_capture(square);
        }
    }

    fn choose_sense(
        &mut self,
        _sense_actions: &[Square],
        move_actions: &[Move],
        seconds_left: f64,
    ) -> Option<Square> {
        let game = self.game.as_mut()?;
        let ctx = SenseContext {
            board: &game.board,
            captured_square: game.captured_square,
            legal_moves: move_actions,
            params: &self.params,
        };
        let decision = SensePlanner::choose(&ctx, &mut game.search, &mut self.oracle, &mut self.rng);
        event!(
            target: "recon_bot::agent",
            Level::DEBUG,
            turn = game.turn,
            seconds_left,
            square = %decision.square,
            reason = ?decision.reason,
            "choose_sense"
        );
        Some(decision.square)
    }

    fn handle_sense_result(&mut self, sense_result: &[SenseObservation]) {
        let Some(game) = self.game_mut("sense_result") else {
            return;
        };
        game.board.apply_sense(sense_result);
        game.search.observe_sense(sense_result);
        if game.search.proxy() {
            event!(
                target: "recon_bot::agent",
                Level::DEBUG,
                "no opponent king in sensed region"
            );
        }
    }

    fn choose_move(&mut self, move_actions: &[Move], seconds_left: f64) -> Option<Move> {
        let game = self.game.as_mut()?;
        game.turn += 1;
        let decision = MovePlanner::choose(
            &game.board,
            move_actions,
            self.params.move_time,
            &mut self.oracle,
        );
        event!(
            target: "recon_bot::agent",
            Level::DEBUG,
            turn = game.turn,
            seconds_left,
            reason = ?decision.reason,
            "choose_move"
        );
        decision.mv
    }

    fn handle_move_result(
        &mut self,
        requested_move: Option<Move>,
        taken_move: Option<Move>,
        captured_opponent_piece: bool,
        capture_square: Option<Square>,
    ) {
        let Some(game) = self.game_mut("move_result") else {
            return;
        };
        if requested_move != taken_move {
            event!(
                target: "recon_bot::agent",
                Level::DEBUG,
                requested = ?requested_move.map(|mv| mv.to_string()),
                taken = ?taken_move.map(|mv| mv.to_string()),
                "host adjusted our move"
            );
        }
        game.board.apply_own_move(taken_move.as_ref());

        // En passant removes a pawn away from the destination square.
        if captured_opponent_piece
            && let Some(square) = capture_square
            && taken_move.is_some_and(|mv| mv.to != square)
        {
            game.board.clear_square(square);
        }
    }

    fn handle_game_end(
        &mut self,
        winner_color: Option<Color>,
        win_reason: Option<WinReason>,
        game_history: &GameHistory,
    ) {
        let turns = self.game.as_ref().map_or(0, |game| game.turn);
        event!(
            target: "recon_bot::agent",
            Level::INFO,
            winner = ?winner_color,
            reason = ?win_reason,
            turns,
            history_moves = game_history.taken_moves.len(),
            "game end"
        );
        self.oracle.release();
        self.game = None;
    }
}
