#![deny(warnings)]
//! Board geometry, move notation and the belief board for reconnaissance-blind chess.
//!
//! Rules questions (attack sets, FEN encoding, square algebra) are answered by
//! `shakmaty`; this crate only layers the partial-information bookkeeping on top.

pub mod belief;
pub mod model;

pub use belief::{BoardModel, SenseObservation};
pub use model::moves::{Move, ParseMoveError};
pub use model::square::{flipped, flipped_for, relative_rank, sense_region};

pub use shakmaty::{Bitboard, Board, Color, Piece, Role, Square};
