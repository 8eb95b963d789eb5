use std::fs;
use std::path::Path;

use recon_bench::config::ScenarioConfig;
use recon_bench::scenario::ScenarioRunner;
use serde_json::Value;
use tempfile::tempdir;

fn load_config(output_dir: &Path, oracle: &str, events: &str) -> ScenarioConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
agent:
  seed: 11
oracle:
{oracle}
events:
{events}
outputs:
  jsonl: "{jsonl}"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("{run_id}").join("hooks.jsonl").display()
    );

    let mut cfg: ScenarioConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn read_rows(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("jsonl written")
        .lines()
        .map(|line| serde_json::from_str(line).expect("row is json"))
        .collect()
}

const CAPTURE_EVENTS: &str = r#"
  - hook: "game_start"
    color: "white"
    fen: "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1"
  - hook: "opponent_move_result"
    capture_square: "e4"
  - hook: "choose_sense"
  - hook: "sense_result"
    observations:
      - { square: "e4", piece: "n" }
      - { square: "e5" }
  - hook: "choose_move"
    move_actions: ["d2d4"]
  - hook: "move_result"
    requested: "d2d4"
    taken: "d2d4"
  - hook: "game_end"
    winner: "black"
    reason: "timeout"
"#;

#[test]
fn capture_scenario_writes_one_row_per_hook() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(
        dir.path(),
        "  kind: \"scripted\"\n  replies: [\"d2d4\"]",
        CAPTURE_EVENTS,
    );
    let outputs = config.resolved_outputs();
    assert!(outputs.jsonl.starts_with(dir.path().join("test_smoke")));

    let runner = ScenarioRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("scenario completes");

    assert_eq!(summary.hooks_played, 7);
    assert_eq!(summary.senses, 1);
    assert_eq!(summary.moves, 1);
    assert_eq!(summary.passes, 0);

    let rows = read_rows(&summary.jsonl_path);
    let hooks: Vec<&str> = rows.iter().map(|row| row["hook"].as_str().unwrap()).collect();
    assert_eq!(
        hooks,
        [
            "game_start",
            "opponent_move_result",
            "choose_sense",
            "sense_result",
            "choose_move",
            "move_result",
            "game_end",
        ]
    );
    assert_eq!(rows[2]["decision"], "e4");
    assert_eq!(rows[4]["decision"], "d2d4");
    assert_eq!(rows[0]["run_id"], "test_smoke");
    assert!(rows[0]["believed_king"].is_string());
    assert!(rows[6].get("believed_king").is_none());
    assert!(rows.iter().all(|row| row["elapsed_ms"].as_f64().is_some()));
}

#[test]
fn oracle_fault_is_logged_as_pass_and_game_is_closed() {
    let dir = tempdir().expect("temp dir");
    let events = r#"
  - hook: "game_start"
    color: "black"
  - hook: "choose_move"
"#;
    let config = load_config(
        dir.path(),
        "  kind: \"scripted\"\n  replies: [\"fault\"]",
        events,
    );
    let outputs = config.resolved_outputs();

    let summary = ScenarioRunner::new(config, outputs)
        .expect("runner created")
        .run()
        .expect("scenario completes");

    assert_eq!(summary.passes, 1);
    let rows = read_rows(&summary.jsonl_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1]["decision"], "pass");
    assert_eq!(rows[2]["hook"], "game_end");
}

#[test]
fn reachable_king_is_taken_without_oracle() {
    let dir = tempdir().expect("temp dir");
    let events = r#"
  - hook: "game_start"
    color: "white"
    fen: "4k3/8/8/8/Q7/8/8/4K3 w - - 0 1"
  - hook: "choose_move"
"#;
    let config = load_config(dir.path(), "  kind: \"scripted\"", events);
    let outputs = config.resolved_outputs();

    let summary = ScenarioRunner::new(config, outputs)
        .expect("runner created")
        .run()
        .expect("scenario completes");

    let rows = read_rows(&summary.jsonl_path);
    assert_eq!(rows[1]["decision"], "a4e8");
    assert_eq!(summary.passes, 0);
}

#[test]
fn bundled_scenario_validates() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/capture_probe.yaml");
    let config = ScenarioConfig::from_path(&path).expect("bundled scenario loads");
    assert_eq!(config.run_id, "capture_probe");
    assert_eq!(config.steps().unwrap().len(), 7);
}
