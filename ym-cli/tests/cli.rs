use std::fs;
use std::process::{Command, Output};

use serde_json::Value;

fn yams_bin() -> String {
    env!("CARGO_BIN_EXE_yams").to_string()
}

fn run(args: &[&str]) -> Output {
    Command::new(yams_bin()).args(args).output().unwrap()
}

fn assert_ok(out: &Output) {
    assert!(
        out.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
}

fn greedy_config(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("greedy.yaml");
    fs::write(
        &path,
        "agent:\n  scorer: { kind: raw_best, memoize: true }\n  lock: { kind: greedy }\neval:\n  games: 3\n  seed: 5\n",
    )
    .unwrap();
    path
}

#[test]
fn help_lists_subcommands() {
    let out = run(&["--help"]);
    assert_ok(&out);
    let s = String::from_utf8_lossy(&out.stdout);
    for cmd in ["play", "eval", "targets"] {
        assert!(s.contains(cmd), "missing {cmd} in help:\n{s}");
    }
}

#[test]
fn play_json_is_a_complete_game() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = greedy_config(dir.path());
    let out = run(&[
        "play",
        "--config",
        cfg.to_str().unwrap(),
        "--seed",
        "9",
        "--deterministic",
        "--json",
    ]);
    assert_ok(&out);
    let v: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["player"], "YamsT1");
    assert_eq!(v["rounds"].as_array().unwrap().len(), 13);

    // Event-keyed dice: same seed, same game.
    let again = run(&[
        "play",
        "--config",
        cfg.to_str().unwrap(),
        "--seed",
        "9",
        "--deterministic",
        "--json",
    ]);
    assert_eq!(out.stdout, again.stdout);
}

#[test]
fn play_text_prints_rounds_and_total() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = greedy_config(dir.path());
    let out = run(&["play", "--config", cfg.to_str().unwrap()]);
    assert_ok(&out);
    let s = String::from_utf8_lossy(&out.stdout);
    assert!(s.contains("Round 13:"));
    assert!(s.contains("Total: "));
}

#[test]
fn eval_writes_run_directory() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = greedy_config(dir.path());
    let run_dir = dir.path().join("run");
    let out = run(&[
        "eval",
        "--config",
        cfg.to_str().unwrap(),
        "--games",
        "4",
        "--threads",
        "2",
        "--out",
        run_dir.to_str().unwrap(),
    ]);
    assert_ok(&out);
    let s = String::from_utf8_lossy(&out.stdout);
    assert!(s.contains("Games: 4"));

    let manifest: Value = serde_json::from_slice(&fs::read(run_dir.join("run.json")).unwrap()).unwrap();
    assert_eq!(manifest["games_completed"], 4);
    assert_eq!(manifest["agent"], "YamsT1");
    assert_eq!(manifest["config_hash"].as_str().unwrap().len(), 64);
    assert!(manifest["finished_ts_ms"].is_u64());

    let events = fs::read_to_string(run_dir.join("eval.ndjson")).unwrap();
    let lines: Vec<Value> = events
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[4]["event"], "eval_summary");
    assert_eq!(lines[0]["run_id"], manifest["run_id"]);
}

#[test]
fn targets_round_trip_into_a_target_agent() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = greedy_config(dir.path());
    let targets = dir.path().join("target_median_YamsT1.json");
    let out = run(&[
        "targets",
        "--config",
        cfg.to_str().unwrap(),
        "--out",
        targets.to_str().unwrap(),
    ]);
    assert_ok(&out);
    let v: Value = serde_json::from_slice(&fs::read(&targets).unwrap()).unwrap();
    assert_eq!(v.as_object().unwrap().len(), 14);

    // Relative path resolved next to the config file.
    let t_cfg = dir.path().join("t.yaml");
    fs::write(
        &t_cfg,
        "agent:\n  scorer: { kind: target_relative, targets: target_median_YamsT1.json }\n  lock: { kind: greedy }\neval:\n  games: 2\n",
    )
    .unwrap();
    let out = run(&["eval", "--config", t_cfg.to_str().unwrap(), "--no-hist"]);
    assert_ok(&out);
    assert!(String::from_utf8_lossy(&out.stdout).contains("YamsT1T_median_YamsT1"));
}

#[test]
fn bad_config_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "agent: { lock: { kind: lookahead, top_k: 0 } }\n").unwrap();
    let out = run(&["eval", "--config", path.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("top_k"));
}

#[test]
fn shipped_configs_parse() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../configs");
    let expected = [
        ("random.yaml", "YamsRandom"),
        ("t1.yaml", "YamsT1"),
        ("t1e.yaml", "YamsT1E"),
        ("t1t.yaml", "YamsT1T_reference"),
        ("t2k3e.yaml", "YamsT2K3E"),
    ];
    for (name, agent) in expected {
        let cfg = ym_core::Config::load(dir.join(name)).unwrap();
        assert!(cfg.eval.games > 0, "{name}");
        let built = ym_agents::Agent::from_config(&cfg.agent, 0).unwrap();
        assert_eq!(built.name(), agent, "{name}");
    }
}
