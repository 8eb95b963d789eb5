//! The agent's belief about full board occupancy.
//!
//! Own pieces are tracked exactly from host reports; opponent pieces are last-seen
//! or assumed positions that sensing overwrites.

mod board;

pub use board::{BoardModel, SenseObservation};
