use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::Level;
use tracing::span::EnteredSpan;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Crates whose events end up in the telemetry log.
const LOG_TARGETS: [&str; 2] = ["recon_bot", "recon_bench"];

/// Keeps the writer flushing and the scenario span open until dropped.
pub struct LoggingGuard {
    _scenario: EnteredSpan,
    _writer: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Routes agent and runner events to `telemetry.jsonl` beside the hook log.
///
/// Every line carries the run id through the enclosing `scenario` span.
/// `RUST_LOG` replaces the configured per-target filter.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_path = telemetry_path(outputs);
    if let Some(dir) = telemetry_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;
    let (writer, writer_guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(writer)
        .finish();

    // Tests may have installed a subscriber already.
    let _ = tracing::subscriber::set_global_default(subscriber);

    let scenario =
        tracing::info_span!(target: "recon_bench::scenario", "scenario", run_id = %run_id)
            .entered();

    Ok(Some(LoggingGuard {
        _scenario: scenario,
        _writer: writer_guard,
        telemetry_path,
    }))
}

fn telemetry_path(outputs: &ResolvedOutputs) -> PathBuf {
    outputs.jsonl.with_file_name(TELEMETRY_FILE)
}

fn filter_directives(level: Level) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={}", level.as_str().to_ascii_lowercase()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_sits_beside_hook_log() {
        let outputs = ResolvedOutputs {
            jsonl: PathBuf::from("bench/out/run_7/hooks.jsonl"),
        };
        assert_eq!(
            telemetry_path(&outputs),
            PathBuf::from("bench/out/run_7/telemetry.jsonl")
        );

        let bare = ResolvedOutputs {
            jsonl: PathBuf::from("hooks.jsonl"),
        };
        assert_eq!(telemetry_path(&bare), PathBuf::from("telemetry.jsonl"));
    }

    #[test]
    fn filter_covers_agent_and_runner_only() {
        assert_eq!(
            filter_directives(Level::DEBUG),
            "recon_bot=debug,recon_bench=debug"
        );
    }

    #[test]
    fn disabled_logging_creates_nothing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let outputs = ResolvedOutputs {
            jsonl: dir.path().join("hooks.jsonl"),
        };

        let guard = init_logging(&LoggingConfig::default(), &outputs, "quiet").unwrap();

        assert!(guard.is_none());
        assert!(!telemetry_path(&outputs).exists());
    }
}
