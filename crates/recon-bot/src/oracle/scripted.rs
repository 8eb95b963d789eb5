use super::{Oracle, OracleFault, OracleRequest};
use recon_core::Move;
use std::collections::VecDeque;

/// One canned oracle answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedReply {
    Move(Move),
    NoMove,
    Fault,
}

/// Oracle that replays a fixed queue of replies and records every request.
///
/// An exhausted script behaves like an engine that has died.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOracle {
    replies: VecDeque<ScriptedReply>,
    requests: Vec<OracleRequest>,
    released: bool,
}

impl ScriptedOracle {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            requests: Vec::new(),
            released: false,
        }
    }

    pub fn requests(&self) -> &[OracleRequest] {
        &self.requests
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Oracle for ScriptedOracle {
    fn best_move(&mut self, request: &OracleRequest) -> Result<Option<Move>, OracleFault> {
        if self.released {
            return Err(OracleFault::Released);
        }
        self.requests.push(request.clone());
        match self.replies.pop_front() {
            Some(ScriptedReply::Move(mv)) => Ok(Some(mv)),
            Some(ScriptedReply::NoMove) => Ok(None),
            Some(ScriptedReply::Fault) => Err(OracleFault::Protocol("scripted fault".into())),
            None => Err(OracleFault::Terminated),
        }
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recon_core::Square;
    use std::time::Duration;

    fn request() -> OracleRequest {
        OracleRequest {
            fen: "8/8/8/8/8/8/8/8 w - - 0 1".into(),
            budget: Duration::from_millis(10),
        }
    }

    #[test]
    fn replays_in_order_then_terminates() {
        let mv = Move::new(Square::G1, Square::F3);
        let mut oracle = ScriptedOracle::new([ScriptedReply::Move(mv), ScriptedReply::NoMove]);
        assert_eq!(oracle.best_move(&request()).unwrap(), Some(mv));
        assert_eq!(oracle.best_move(&request()).unwrap(), None);
        assert!(matches!(
            oracle.best_move(&request()),
            Err(OracleFault::Terminated)
        ));
        assert_eq!(oracle.requests().len(), 3);
    }

    #[test]
    fn released_oracle_refuses_queries() {
        let mut oracle = ScriptedOracle::new([ScriptedReply::NoMove]);
        oracle.release();
        assert!(matches!(
            oracle.best_move(&request()),
            Err(OracleFault::Released)
        ));
        assert_eq!(oracle.remaining(), 1);
    }
}
