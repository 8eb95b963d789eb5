use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use recon_bot::{
    BeliefAgent, BotParams, ConfigError, GameHistory, Oracle, OracleConfig, Player,
    ScriptedOracle, UciEngine,
};
use recon_core::{Move, Square};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{HostStep, OracleSource, ResolvedOutputs, ScenarioConfig, ValidationError};

/// Replays a scripted host against one agent, logging every hook.
pub struct ScenarioRunner {
    config: ScenarioConfig,
    outputs: ResolvedOutputs,
    steps: Vec<HostStep>,
    params: BotParams,
}

/// Summary details returned after a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub hooks_played: usize,
    pub senses: usize,
    pub moves: usize,
    pub passes: usize,
    pub jsonl_path: PathBuf,
}

/// One JSONL row per hook call.
#[derive(Debug, Serialize)]
struct HookRow<'a> {
    run_id: &'a str,
    index: usize,
    hook: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    believed_king: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_state: Option<String>,
    elapsed_ms: f64,
}

/// What a single hook call produced.
enum HookOutcome {
    Observed,
    Sense(Option<Square>),
    Move(Option<Move>),
}

impl ScenarioRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: ScenarioConfig, outputs: ResolvedOutputs) -> Result<Self, ScenarioError> {
        let steps = config.steps()?;
        let params = config.agent.bot_params()?;
        Ok(Self {
            config,
            outputs,
            steps,
            params,
        })
    }

    /// Execute the script, streaming JSONL rows to disk.
    ///
    /// A script without a final `game_end` is closed with one so the oracle
    /// is always released.
    pub fn run(&self) -> Result<RunSummary, ScenarioError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);

        let oracle = build_oracle(&self.config.oracle)?;
        let mut agent = BeliefAgent::new(oracle, self.params.clone());
        let mut history = GameHistory::default();
        let mut summary = RunSummary {
            hooks_played: 0,
            senses: 0,
            moves: 0,
            passes: 0,
            jsonl_path: self.outputs.jsonl.clone(),
        };

        let closing = HostStep::GameEnd {
            winner: None,
            reason: None,
        };
        let needs_closing = !matches!(self.steps.last(), Some(HostStep::GameEnd { .. }));
        let script = self
            .steps
            .iter()
            .chain(needs_closing.then_some(&closing));

        for (index, step) in script.enumerate() {
            let started = Instant::now();
            let outcome = play_step(&mut agent, step, &mut history);
            let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

            let decision = match outcome {
                HookOutcome::Observed => None,
                HookOutcome::Sense(square) => {
                    summary.senses += 1;
                    history.senses.push(square);
                    Some(square.map_or_else(|| "none".to_string(), |sq| sq.to_string()))
                }
                HookOutcome::Move(mv) => {
                    summary.moves += 1;
                    if mv.is_none() {
                        summary.passes += 1;
                    }
                    Some(mv.map_or_else(|| "pass".to_string(), |mv| mv.to_string()))
                }
            };

            let search = agent.king_search();
            let row = HookRow {
                run_id: &self.config.run_id,
                index,
                hook: step.hook(),
                decision,
                believed_king: search.map(|search| search.believed_square().to_string()),
                search_state: search.map(|search| format!("{:?}", search.state())),
                elapsed_ms,
            };
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            summary.hooks_played += 1;
        }

        writer.flush()?;
        event!(
            target: "recon_bench::scenario",
            Level::INFO,
            run_id = %self.config.run_id,
            hooks = summary.hooks_played,
            passes = summary.passes,
            "scenario complete"
        );
        Ok(summary)
    }
}

fn play_step<P: Player>(agent: &mut P, step: &HostStep, history: &mut GameHistory) -> HookOutcome {
    match step {
        HostStep::GameStart { color, board } => {
            agent.handle_game_start(*color, board.clone());
            HookOutcome::Observed
        }
        HostStep::OpponentMoveResult { capture_square } => {
            agent.handle_opponent_move_result(capture_square.is_some(), *capture_square);
            HookOutcome::Observed
        }
        HostStep::ChooseSense {
            sense_actions,
            move_actions,
            seconds_left,
        } => HookOutcome::Sense(agent.choose_sense(sense_actions, move_actions, *seconds_left)),
        HostStep::SenseResult { observations } => {
            agent.handle_sense_result(observations);
            HookOutcome::Observed
        }
        HostStep::ChooseMove {
            move_actions,
            seconds_left,
        } => HookOutcome::Move(agent.choose_move(move_actions, *seconds_left)),
        HostStep::MoveResult {
            requested,
            taken,
            capture_square,
        } => {
            history.taken_moves.push(*taken);
            agent.handle_move_result(
                *requested,
                *taken,
                capture_square.is_some(),
                *capture_square,
            );
            HookOutcome::Observed
        }
        HostStep::GameEnd { winner, reason } => {
            agent.handle_game_end(*winner, *reason, history);
            HookOutcome::Observed
        }
    }
}

fn build_oracle(source: &OracleSource) -> Result<Box<dyn Oracle>, ScenarioError> {
    match source {
        OracleSource::Uci { command } => {
            let config = match command {
                Some(path) => OracleConfig::new(path)?,
                None => OracleConfig::from_env()?,
            };
            Ok(Box::new(UciEngine::spawn(&config)?))
        }
        OracleSource::Scripted { .. } => {
            let replies = source.scripted_replies()?;
            Ok(Box::new(ScriptedOracle::new(replies)))
        }
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), ScenarioError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("oracle setup failed: {0}")]
    Oracle(#[from] ConfigError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize hook row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}
