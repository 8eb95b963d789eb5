pub mod bot;
pub mod oracle;
pub mod player;

pub use bot::{
    BotParams, KingSearch, KingSearchState, MoveDecision, MovePlanner, MoveReason, SenseContext,
    SenseDecision, SensePlanner, SenseReason,
};
pub use oracle::{
    ConfigError, Oracle, OracleConfig, OracleFault, OracleRequest, ScriptedOracle, ScriptedReply,
    UciEngine,
};
pub use player::{BeliefAgent, GameHistory, Player, WinReason};
