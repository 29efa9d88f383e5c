use ym_agents::TargetScores;
use ym_core::{AgentConfig, Category, Config, EvalConfig, LockConfig, ScorerConfig};

use crate::{eval_schedule, simulate, simulate_with, write_targets, EvalError, EvalOptions};

fn greedy_config(games: u32, seed: u64, threads: Option<usize>) -> Config {
    Config {
        agent: AgentConfig {
            name: None,
            scorer: ScorerConfig::RawBest { memoize: true },
            lock: LockConfig::Greedy,
        },
        eval: EvalConfig {
            games,
            seed,
            deterministic_dice: true,
            threads,
        },
    }
}

#[test]
fn schedule_is_deterministic_and_seeds_differ() {
    let a = eval_schedule(9, 16);
    assert_eq!(a, eval_schedule(9, 16));
    assert_eq!(a.len(), 16);
    assert!(a.iter().enumerate().all(|(i, s)| s.game_id == i as u64));
    let mut seeds: Vec<u64> = a.iter().map(|s| s.seed).collect();
    seeds.sort_unstable();
    seeds.dedup();
    assert_eq!(seeds.len(), 16);
    assert_ne!(eval_schedule(10, 1)[0].seed, a[0].seed);
}

#[test]
fn results_do_not_depend_on_thread_count() {
    let one = simulate(&greedy_config(6, 3, Some(1))).unwrap();
    let many = simulate(&greedy_config(6, 3, Some(3))).unwrap();
    let global = simulate(&greedy_config(6, 3, None)).unwrap();
    assert_eq!(one.scores(), many.scores());
    assert_eq!(one.scores(), global.scores());
    assert_eq!(one.agent, "YamsT1");
    assert_eq!(one.summary.n, 6);
    for (i, g) in one.games.iter().enumerate() {
        assert_eq!(g.game_id, i as u64);
        assert!(g.sheet.is_complete());
        assert_eq!(g.sheet.total(), g.total);
        assert!(g.cache.lock.misses > 0);
    }
}

#[test]
fn zero_games_is_rejected() {
    assert!(matches!(
        simulate(&greedy_config(0, 0, None)),
        Err(EvalError::InvalidConfig(_))
    ));
}

#[test]
fn missing_targets_fail_before_running() {
    let mut cfg = greedy_config(2, 0, None);
    cfg.agent.scorer = ScorerConfig::TargetRelative {
        targets: "/nonexistent/target_none.json".into(),
    };
    assert!(matches!(simulate(&cfg), Err(EvalError::Agent(_))));
}

#[test]
fn events_file_has_one_line_per_game_plus_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eval.ndjson");
    let opts = EvalOptions {
        events_path: Some(path.clone()),
        run_id: "t".into(),
    };
    let report = simulate_with(&greedy_config(3, 1, Some(2)), &opts).unwrap();

    let lines = ym_logging::read_ndjson_lenient(&path).unwrap();
    assert_eq!(lines.len(), 4);
    for (i, line) in lines[..3].iter().enumerate() {
        assert_eq!(line["event"], "game_finished");
        assert_eq!(line["game_id"], i as u64);
        assert_eq!(line["total"], report.games[i].total);
        assert_eq!(line["rows"].as_array().unwrap().len(), 14);
    }
    assert_eq!(lines[3]["event"], "eval_summary");
    assert_eq!(lines[3]["games"], 3);
    assert_eq!(lines[3]["run_id"], "t");
}

#[test]
fn medians_feed_a_target_relative_agent() {
    let report = simulate(&greedy_config(5, 11, None)).unwrap();
    let medians = report.category_medians();
    assert_eq!(medians.len(), 14);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("target_median_YamsT1.json");
    write_targets(&path, &medians).unwrap();
    let targets = TargetScores::load(&path).unwrap();
    assert_eq!(targets.label(), "median_YamsT1");
    assert_eq!(targets.get(Category::Yams), medians[&Category::Yams]);

    let mut cfg = greedy_config(2, 11, None);
    cfg.agent.scorer = ScorerConfig::TargetRelative { targets: path };
    let t = simulate(&cfg).unwrap();
    assert_eq!(t.agent, "YamsT1T_median_YamsT1");
    assert_eq!(t.games.len(), 2);
}
