use recon_bot::{BotParams, ScriptedReply, WinReason};
use recon_core::{Board, BoardModel, Color, Move, Piece, SenseObservation, Square};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

const DEFAULT_SECONDS_LEFT: f64 = 900.0;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root scenario configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    pub run_id: String,
    #[serde(default)]
    pub agent: AgentConfig,
    pub oracle: OracleSource,
    pub events: Vec<HostEvent>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ScenarioConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: ScenarioConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        self.agent.bot_params()?;
        self.oracle.validate()?;
        self.steps()?;
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
        }
    }

    /// Typed host script. The first step is always a game start.
    pub fn steps(&self) -> Result<Vec<HostStep>, ValidationError> {
        if self.events.is_empty() {
            return Err(invalid("events", "at least one event must be specified"));
        }

        let steps = self
            .events
            .iter()
            .enumerate()
            .map(|(index, event)| event.resolve(index))
            .collect::<Result<Vec<_>, _>>()?;

        if !matches!(steps.first(), Some(HostStep::GameStart { .. })) {
            return Err(invalid("events[0]", "scenario must open with game_start"));
        }
        if let Some(index) = steps
            .iter()
            .skip(1)
            .position(|step| matches!(step, HostStep::GameStart { .. }))
        {
            return Err(invalid(
                &format!("events[{}]", index + 1),
                "game_start may only appear once",
            ));
        }
        Ok(steps)
    }
}

/// Agent tuning block: a preset plus optional overrides.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default)]
    pub preset: ParamsPreset,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub king_visit_threshold: Option<u32>,
    #[serde(default)]
    pub move_time_ms: Option<u64>,
    #[serde(default)]
    pub preview_time_ms: Option<u64>,
    #[serde(default)]
    pub default_king_square: Option<String>,
    #[serde(default)]
    pub king_flight_squares: Option<[String; 3]>,
    #[serde(default)]
    pub center_squares: Option<[String; 3]>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParamsPreset {
    #[default]
    Default,
    Conservative,
}

impl AgentConfig {
    pub fn bot_params(&self) -> Result<BotParams, ValidationError> {
        let mut params = match self.preset {
            ParamsPreset::Default => BotParams::default(),
            ParamsPreset::Conservative => BotParams::conservative(),
        };

        if let Some(threshold) = self.king_visit_threshold {
            if threshold == 0 {
                return Err(invalid(
                    "agent.king_visit_threshold",
                    "threshold must be at least 1",
                ));
            }
            params.king_visit_threshold = threshold;
        }
        if let Some(ms) = self.move_time_ms {
            params.move_time = positive_budget("agent.move_time_ms", ms)?;
        }
        if let Some(ms) = self.preview_time_ms {
            params.preview_time = positive_budget("agent.preview_time_ms", ms)?;
        }
        if let Some(raw) = self.default_king_square.as_deref() {
            params.default_king_square = parse_square("agent.default_king_square", raw)?;
        }
        if let Some(raw) = self.king_flight_squares.as_ref() {
            params.king_flight_squares = parse_triple("agent.king_flight_squares", raw)?;
        }
        if let Some(raw) = self.center_squares.as_ref() {
            params.center_squares = parse_triple("agent.center_squares", raw)?;
        }
        params.seed = self.seed;
        Ok(params)
    }
}

fn positive_budget(field: &str, ms: u64) -> Result<Duration, ValidationError> {
    if ms == 0 {
        return Err(invalid(field, "budget must be greater than zero"));
    }
    Ok(Duration::from_millis(ms))
}

fn parse_triple(field: &str, raw: &[String; 3]) -> Result<[Square; 3], ValidationError> {
    let mut squares = [Square::A1; 3];
    for (slot, value) in squares.iter_mut().zip(raw) {
        *slot = parse_square(field, value)?;
    }
    Ok(squares)
}

/// Where the agent's move oracle comes from.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OracleSource {
    /// External UCI engine; falls back to `STOCKFISH_EXECUTABLE` without a command.
    Uci {
        #[serde(default)]
        command: Option<PathBuf>,
    },
    /// Canned replies: UCI moves, `none` for no move, `fault` for an engine failure.
    Scripted {
        #[serde(default)]
        replies: Vec<String>,
    },
}

impl OracleSource {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            OracleSource::Uci { command: Some(path) } if path.as_os_str().is_empty() => {
                Err(invalid("oracle.command", "path must not be empty"))
            }
            OracleSource::Uci { .. } => Ok(()),
            OracleSource::Scripted { .. } => self.scripted_replies().map(|_| ()),
        }
    }

    pub fn scripted_replies(&self) -> Result<Vec<ScriptedReply>, ValidationError> {
        let OracleSource::Scripted { replies } = self else {
            return Ok(Vec::new());
        };
        replies
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let field = format!("oracle.replies[{index}]");
                match raw.trim().to_ascii_lowercase().as_str() {
                    "none" => Ok(ScriptedReply::NoMove),
                    "fault" => Ok(ScriptedReply::Fault),
                    _ => parse_move_or_null(&field, raw)
                        .map(|mv| mv.map_or(ScriptedReply::NoMove, ScriptedReply::Move)),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    KingCapture,
    Timeout,
    Resign,
    TurnLimit,
    MoveLimit,
}

impl From<EndReason> for WinReason {
    fn from(reason: EndReason) -> Self {
        match reason {
            EndReason::KingCapture => WinReason::KingCapture,
            EndReason::Timeout => WinReason::Timeout,
            EndReason::Resign => WinReason::Resign,
            EndReason::TurnLimit => WinReason::TurnLimit,
            EndReason::MoveLimit => WinReason::MoveLimit,
        }
    }
}

/// One sensed square; `piece` is a FEN letter, absent for an empty square.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ObservedSquare {
    pub square: String,
    #[serde(default)]
    pub piece: Option<String>,
}

/// Host call as written in the scenario file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum HostEvent {
    GameStart {
        color: Side,
        #[serde(default)]
        fen: Option<String>,
    },
    OpponentMoveResult {
        #[serde(default)]
        capture_square: Option<String>,
    },
    ChooseSense {
        #[serde(default)]
        sense_actions: Vec<String>,
        #[serde(default)]
        move_actions: Vec<String>,
        #[serde(default = "default_seconds_left")]
        seconds_left: f64,
    },
    SenseResult {
        #[serde(default)]
        observations: Vec<ObservedSquare>,
    },
    ChooseMove {
        #[serde(default)]
        move_actions: Vec<String>,
        #[serde(default = "default_seconds_left")]
        seconds_left: f64,
    },
    MoveResult {
        #[serde(default)]
        requested: Option<String>,
        #[serde(default)]
        taken: Option<String>,
        #[serde(default)]
        capture_square: Option<String>,
    },
    GameEnd {
        #[serde(default)]
        winner: Option<Side>,
        #[serde(default)]
        reason: Option<EndReason>,
    },
}

fn default_seconds_left() -> f64 {
    DEFAULT_SECONDS_LEFT
}

impl HostEvent {
    fn resolve(&self, index: usize) -> Result<HostStep, ValidationError> {
        let field = |name: &str| format!("events[{index}].{name}");
        let step = match self {
            HostEvent::GameStart { color, fen } => {
                let color = Color::from(*color);
                let board = match fen.as_deref() {
                    Some(fen) => BoardModel::from_fen(fen, color)
                        .map_err(|err| invalid(&field("fen"), &err.to_string()))?
                        .board()
                        .clone(),
                    None => Board::default(),
                };
                HostStep::GameStart { color, board }
            }
            HostEvent::OpponentMoveResult { capture_square } => HostStep::OpponentMoveResult {
                capture_square: parse_optional_square(&field("capture_square"), capture_square)?,
            },
            HostEvent::ChooseSense {
                sense_actions,
                move_actions,
                seconds_left,
            } => HostStep::ChooseSense {
                sense_actions: sense_actions
                    .iter()
                    .map(|raw| parse_square(&field("sense_actions"), raw))
                    .collect::<Result<_, _>>()?,
                move_actions: parse_moves(&field("move_actions"), move_actions)?,
                seconds_left: *seconds_left,
            },
            HostEvent::SenseResult { observations } => HostStep::SenseResult {
                observations: observations
                    .iter()
                    .map(|obs| parse_observation(&field("observations"), obs))
                    .collect::<Result<_, _>>()?,
            },
            HostEvent::ChooseMove {
                move_actions,
                seconds_left,
            } => HostStep::ChooseMove {
                move_actions: parse_moves(&field("move_actions"), move_actions)?,
                seconds_left: *seconds_left,
            },
            HostEvent::MoveResult {
                requested,
                taken,
                capture_square,
            } => HostStep::MoveResult {
                requested: parse_optional_move(&field("requested"), requested)?,
                taken: parse_optional_move(&field("taken"), taken)?,
                capture_square: parse_optional_square(&field("capture_square"), capture_square)?,
            },
            HostEvent::GameEnd { winner, reason } => HostStep::GameEnd {
                winner: winner.map(Color::from),
                reason: reason.map(WinReason::from),
            },
        };
        Ok(step)
    }
}

/// Host call with every square, move and piece parsed.
///
/// A capture square in an opponent or own move result implies a capture.
#[derive(Debug, Clone, PartialEq)]
pub enum HostStep {
    GameStart {
        color: Color,
        board: Board,
    },
    OpponentMoveResult {
        capture_square: Option<Square>,
    },
    ChooseSense {
        sense_actions: Vec<Square>,
        move_actions: Vec<Move>,
        seconds_left: f64,
    },
    SenseResult {
        observations: Vec<SenseObservation>,
    },
    ChooseMove {
        move_actions: Vec<Move>,
        seconds_left: f64,
    },
    MoveResult {
        requested: Option<Move>,
        taken: Option<Move>,
        capture_square: Option<Square>,
    },
    GameEnd {
        winner: Option<Color>,
        reason: Option<WinReason>,
    },
}

impl HostStep {
    pub fn hook(&self) -> &'static str {
        match self {
            HostStep::GameStart { .. } => "game_start",
            HostStep::OpponentMoveResult { .. } => "opponent_move_result",
            HostStep::ChooseSense { .. } => "choose_sense",
            HostStep::SenseResult { .. } => "sense_result",
            HostStep::ChooseMove { .. } => "choose_move",
            HostStep::MoveResult { .. } => "move_result",
            HostStep::GameEnd { .. } => "game_end",
        }
    }
}

fn parse_square(field: &str, raw: &str) -> Result<Square, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(field, &format!("'{raw}' is not a square")))
}

fn parse_optional_square(
    field: &str,
    raw: &Option<String>,
) -> Result<Option<Square>, ValidationError> {
    raw.as_deref().map(|raw| parse_square(field, raw)).transpose()
}

fn parse_move(field: &str, raw: &str) -> Result<Move, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|err| invalid(field, &format!("'{raw}': {err}")))
}

/// `0000` reads as no move.
fn parse_move_or_null(field: &str, raw: &str) -> Result<Option<Move>, ValidationError> {
    Move::parse_or_null(raw).map_err(|err| invalid(field, &format!("'{raw}': {err}")))
}

fn parse_optional_move(field: &str, raw: &Option<String>) -> Result<Option<Move>, ValidationError> {
    Ok(match raw.as_deref() {
        Some(raw) => parse_move_or_null(field, raw)?,
        None => None,
    })
}

fn parse_moves(field: &str, raw: &[String]) -> Result<Vec<Move>, ValidationError> {
    raw.iter().map(|mv| parse_move(field, mv)).collect()
}

fn parse_observation(
    field: &str,
    obs: &ObservedSquare,
) -> Result<SenseObservation, ValidationError> {
    let square = parse_square(field, &obs.square)?;
    let piece = match obs.piece.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(letter) => {
            let mut chars = letter.chars();
            let piece = match (chars.next(), chars.next()) {
                (Some(ch), None) => Piece::from_char(ch),
                _ => None,
            };
            Some(piece.ok_or_else(|| invalid(field, &format!("'{letter}' is not a piece letter")))?)
        }
    };
    Ok((square, piece))
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        if self.jsonl.trim().is_empty() {
            return Err(invalid("outputs.jsonl", "path must not be empty"));
        }
        if resolve_template(run_id, &self.jsonl).components().count() == 0 {
            return Err(invalid("outputs.jsonl", "resolved path is invalid"));
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(invalid("run_id", "run_id must not be empty"));
    }
    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(invalid(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }
    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

fn invalid(field: &str, message: &str) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
