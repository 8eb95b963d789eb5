//! Contract with the external move-search engine.
//!
//! - `uci`: process client speaking UCI over stdin/stdout.
//! - `scripted`: canned replies for replays and tests.
//! - `config`: locating the engine executable.

mod config;
mod scripted;
mod uci;

pub use config::{ConfigError, OracleConfig, STOCKFISH_ENV_VAR};
pub use scripted::{ScriptedOracle, ScriptedReply};
pub use uci::UciEngine;

use recon_core::Move;
use std::time::Duration;
use thiserror::Error;

/// A position handed to the oracle: belief FEN plus an advisory time budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub fen: String,
    pub budget: Duration,
}

/// Anything that can suggest a move for a position.
pub trait Oracle {
    /// Best move for the request; `Ok(None)` when the engine has no move to offer.
    fn best_move(&mut self, request: &OracleRequest) -> Result<Option<Move>, OracleFault>;

    /// Releases the underlying engine. Later queries fail with [`OracleFault::Released`].
    fn release(&mut self) {}
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn best_move(&mut self, request: &OracleRequest) -> Result<Option<Move>, OracleFault> {
        (**self).best_move(request)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Recoverable failures while talking to the oracle.
#[derive(Debug, Error)]
pub enum OracleFault {
    #[error("engine I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine terminated unexpectedly")]
    Terminated,
    #[error("engine protocol error: {0}")]
    Protocol(String),
    #[error("engine handle already released")]
    Released,
}
