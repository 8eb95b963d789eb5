use std::path::PathBuf;

use clap::Parser;

use recon_bench::config::ScenarioConfig;
use recon_bench::logging::init_logging;
use recon_bench::scenario::ScenarioRunner;

/// Scripted-host harness for the belief agent.
#[derive(Debug, Parser)]
#[command(
    name = "recon-bench",
    author,
    version,
    about = "Replays a scripted reconnaissance-chess host against the belief agent"
)]
struct Cli {
    /// Path to the YAML scenario file.
    #[arg(short, long, value_name = "FILE", default_value = "scenarios/capture_probe.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the agent RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the scenario (no hooks are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ScenarioConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.agent.seed = Some(seed);
    }

    config.validate()?;

    let outputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let event_count = config.events.len();

    println!(
        "Loaded scenario '{run_id}' with {event_count} event{}",
        if event_count == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: scenario execution skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = ScenarioRunner::new(config, outputs)?;
    let summary = runner.run()?;

    println!(
        "Scenario complete for '{run_id}': {} hooks ({} senses, {} moves, {} passes) → {}",
        summary.hooks_played,
        summary.senses,
        summary.moves,
        summary.passes,
        summary.jsonl_path.display()
    );
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
