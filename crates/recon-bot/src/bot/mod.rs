mod params;
mod play;
mod search;
mod sense;

pub use params::BotParams;
pub use play::{MoveDecision, MovePlanner, MoveReason};
pub use search::{KingSearch, KingSearchState};
pub use sense::{SenseContext, SenseDecision, SensePlanner, SenseReason};
