use crate::bot::{BotParams, KingSearch, MovePlanner};
use crate::oracle::Oracle;
use rand::Rng;
use rand::seq::SliceRandom;
use recon_core::{BoardModel, Move, Square, relative_rank};
use tracing::{Level, event};

/// Relative ranks `0..=2` are a side's home zone; a king beyond it is worth a look.
const KING_HOME_RANKS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseReason {
    /// One of our pieces was taken here last turn.
    CapturedPiece,
    /// The previewed move would capture here.
    PreviewCapture,
    /// Proposed by the king search.
    KingSearch,
    /// Belief has the opponent king out of its home zone.
    AdvancedKing,
    /// Nothing better to do: random centre square.
    CenterProbe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenseDecision {
    pub square: Square,
    pub reason: SenseReason,
}

/// Inputs of one sense decision.
#[derive(Debug, Clone, Copy)]
pub struct SenseContext<'a> {
    pub board: &'a BoardModel,
    pub captured_square: Option<Square>,
    pub legal_moves: &'a [Move],
    pub params: &'a BotParams,
}

pub struct SensePlanner;

impl SensePlanner {
    /// Chooses the square to sense; always produces one.
    ///
    /// The capture preview runs the move planner against an immutable board with
    /// the preview budget, so nothing is committed for the move phase.
    pub fn choose<O, R>(
        ctx: &SenseContext<'_>,
        search: &mut KingSearch,
        oracle: &mut O,
        rng: &mut R,
    ) -> SenseDecision
    where
        O: Oracle + ?Sized,
        R: Rng + ?Sized,
    {
        let decision = Self::select(ctx, search, oracle, rng);
        log_sense_decision(ctx, search, &decision);
        decision
    }

    fn select<O, R>(
        ctx: &SenseContext<'_>,
        search: &mut KingSearch,
        oracle: &mut O,
        rng: &mut R,
    ) -> SenseDecision
    where
        O: Oracle + ?Sized,
        R: Rng + ?Sized,
    {
        if let Some(square) = ctx.captured_square {
            return SenseDecision {
                square,
                reason: SenseReason::CapturedPiece,
            };
        }

        let preview = MovePlanner::choose(
            ctx.board,
            ctx.legal_moves,
            ctx.params.preview_time,
            oracle,
        );
        if let Some(mv) = preview.mv
            && ctx.board.holds_enemy(mv.to)
        {
            return SenseDecision {
                square: mv.to,
                reason: SenseReason::PreviewCapture,
            };
        }

        if let Some(square) = search.propose(rng) {
            return SenseDecision {
                square,
                reason: SenseReason::KingSearch,
            };
        }

        let opponent = ctx.board.opponent();
        if let Some(king) = ctx.board.king_square(opponent)
            && relative_rank(opponent, king) >= KING_HOME_RANKS
        {
            return SenseDecision {
                square: king,
                reason: SenseReason::AdvancedKing,
            };
        }

        let centers = ctx.params.center_for(ctx.board.color());
        let square = *centers.choose(rng).unwrap_or(&centers[1]);
        search.rearm();
        SenseDecision {
            square,
            reason: SenseReason::CenterProbe,
        }
    }
}

fn log_sense_decision(ctx: &SenseContext<'_>, search: &KingSearch, decision: &SenseDecision) {
    event!(
        target: "recon_bot::sense",
        Level::DEBUG,
        color = ?ctx.board.color(),
        square = %decision.square,
        reason = ?decision.reason,
        search_state = ?search.state(),
        proxy = search.proxy(),
        "sense chosen"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::KingSearchState;
    use crate::oracle::{ScriptedOracle, ScriptedReply};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use recon_core::Color;

    fn ctx<'a>(board: &'a BoardModel, params: &'a BotParams) -> SenseContext<'a> {
        SenseContext {
            board,
            captured_square: None,
            legal_moves: &[],
            params,
        }
    }

    #[test]
    fn captured_square_wins_over_everything() {
        let params = BotParams::default();
        let board = BoardModel::starting(Color::White);
        let mut search = KingSearch::for_color(Color::White, &params);
        let mut oracle = ScriptedOracle::default();
        let mut rng = StdRng::seed_from_u64(9);
        let ctx = SenseContext {
            captured_square: Some(Square::C2),
            ..ctx(&board, &params)
        };

        let decision = SensePlanner::choose(&ctx, &mut search, &mut oracle, &mut rng);

        assert_eq!(decision.square, Square::C2);
        assert_eq!(decision.reason, SenseReason::CapturedPiece);
        assert!(oracle.requests().is_empty());
        assert_eq!(
            search.state(),
            KingSearchState::ActivelySearching { visits: 0 }
        );
    }

    #[test]
    fn preview_capture_is_confirmed_first() {
        let params = BotParams::default();
        let board = BoardModel::from_fen(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
            Color::White,
        )
        .unwrap();
        let mut search = KingSearch::for_color(Color::White, &params);
        let mut oracle =
            ScriptedOracle::new([ScriptedReply::Move(Move::new(Square::E4, Square::D5))]);
        let mut rng = StdRng::seed_from_u64(9);

        let decision =
            SensePlanner::choose(&ctx(&board, &params), &mut search, &mut oracle, &mut rng);

        assert_eq!(decision.square, Square::D5);
        assert_eq!(decision.reason, SenseReason::PreviewCapture);
        assert_eq!(oracle.requests()[0].budget, params.preview_time);
    }

    #[test]
    fn quiet_preview_falls_through_to_king_search() {
        let params = BotParams::default();
        let board = BoardModel::starting(Color::Black);
        let mut search = KingSearch::for_color(Color::Black, &params);
        let mut oracle =
            ScriptedOracle::new([ScriptedReply::Move(Move::new(Square::G8, Square::F6))]);
        let mut rng = StdRng::seed_from_u64(9);

        let decision =
            SensePlanner::choose(&ctx(&board, &params), &mut search, &mut oracle, &mut rng);

        assert_eq!(decision.square, Square::E2);
        assert_eq!(decision.reason, SenseReason::KingSearch);
    }

    #[test]
    fn advanced_king_is_checked_before_center() {
        let params = BotParams::default();
        let board = BoardModel::from_fen("8/8/8/8/4k3/8/8/4K3 w - - 0 1", Color::White).unwrap();
        let mut search = KingSearch::for_color(Color::White, &params);
        let mut oracle = ScriptedOracle::new([ScriptedReply::NoMove; 3]);
        let mut rng = StdRng::seed_from_u64(9);
        search.propose(&mut rng);
        search.propose(&mut rng);

        let decision =
            SensePlanner::choose(&ctx(&board, &params), &mut search, &mut oracle, &mut rng);

        assert_eq!(decision.square, Square::E4);
        assert_eq!(decision.reason, SenseReason::AdvancedKing);
    }

    #[test]
    fn center_probe_rearms_search() {
        let params = BotParams::default();
        let board = BoardModel::starting(Color::White);
        let mut search = KingSearch::for_color(Color::White, &params);
        let mut oracle = ScriptedOracle::new([ScriptedReply::NoMove; 3]);
        let mut rng = StdRng::seed_from_u64(9);
        search.propose(&mut rng);
        search.propose(&mut rng);

        let decision =
            SensePlanner::choose(&ctx(&board, &params), &mut search, &mut oracle, &mut rng);

        assert_eq!(decision.reason, SenseReason::CenterProbe);
        assert!(params.center_for(Color::White).contains(&decision.square));
        assert_eq!(
            search.state(),
            KingSearchState::ActivelySearching { visits: 0 }
        );
    }
}
