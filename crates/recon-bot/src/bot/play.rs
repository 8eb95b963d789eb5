use crate::oracle::{Oracle, OracleRequest};
use recon_core::{BoardModel, Move};
use std::time::Duration;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveReason {
    /// A piece attacks the believed king square.
    KingCapture,
    /// The oracle's suggestion for the believed position.
    Oracle,
    /// The oracle failed or had nothing to offer.
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDecision {
    pub mv: Option<Move>,
    pub reason: MoveReason,
}

pub struct MovePlanner;

impl MovePlanner {
    /// Picks a move against the believed board. Never fails: oracle faults become a pass.
    ///
    /// The king-capture shortcut trusts belief; the host may reject the move if
    /// the king is not really there.
    pub fn choose<O: Oracle + ?Sized>(
        board: &BoardModel,
        legal_moves: &[Move],
        budget: Duration,
        oracle: &mut O,
    ) -> MoveDecision {
        let own = board.color();
        if let Some(king) = board.king_square(board.opponent())
            && let Some(attacker) = board.attackers_of(own, king).first()
        {
            let decision = MoveDecision {
                mv: Some(Move::new(attacker, king)),
                reason: MoveReason::KingCapture,
            };
            log_move_decision(legal_moves, &decision);
            return decision;
        }

        let request = OracleRequest {
            fen: board.fen(own),
            budget,
        };
        let decision = match oracle.best_move(&request) {
            Ok(Some(mv)) => MoveDecision {
                mv: Some(mv),
                reason: MoveReason::Oracle,
            },
            Ok(None) => MoveDecision {
                mv: None,
                reason: MoveReason::Pass,
            },
            Err(err) => {
                event!(
                    target: "recon_bot::play",
                    Level::WARN,
                    error = %err,
                    fen = %request.fen,
                    "engine bad state; passing"
                );
                MoveDecision {
                    mv: None,
                    reason: MoveReason::Pass,
                }
            }
        };
        log_move_decision(legal_moves, &decision);
        decision
    }
}

fn log_move_decision(legal_moves: &[Move], decision: &MoveDecision) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    let chosen = decision
        .mv
        .map(|mv| mv.to_string())
        .unwrap_or_else(|| "pass".to_string());
    let in_legal_list = decision.mv.is_some_and(|mv| legal_moves.contains(&mv));

    event!(
        target: "recon_bot::play",
        Level::DEBUG,
        reason = ?decision.reason,
        legal_count = legal_moves.len(),
        chosen = %chosen,
        in_legal_list,
    );
}
