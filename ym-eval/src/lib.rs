//! ym-eval: batch simulation of Yams agents.
//!
//! Every game gets its own agent (and therefore its own caches) and its own dice
//! source, seeded from the run seed. Games run in parallel on rayon; results come
//! back in game order.

pub mod stats;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use ym_agents::{Agent, AgentCacheStats, AgentError, CacheStats};
use ym_core::{
    play_game, splitmix64, AgentConfig, Category, Config, DiceSource, GameError, Scoresheet,
};
use ym_logging::{
    now_ms, CacheStatsV1, EvalSummaryEventV1, GameFinishedEventV1, NdjsonError, NdjsonWriter,
    VersionInfoV1,
};

pub use stats::{category_medians, histogram, summarize_scores, ScoreSummary};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid eval config: {0}")]
    InvalidConfig(&'static str),
    #[error("agent construction failed: {0}")]
    Agent(#[from] AgentError),
    #[error("game {game_id} (seed {seed:#x}) failed: {source}")]
    Game {
        game_id: u64,
        seed: u64,
        #[source]
        source: GameError,
    },
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("event log error: {0}")]
    Events(#[from] NdjsonError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSpec {
    pub game_id: u64,
    pub seed: u64,
}

/// Deterministic per-game seeds: `splitmix64(seed0 ^ i)`.
pub fn eval_schedule(seed0: u64, games: u32) -> Vec<GameSpec> {
    (0..games as u64)
        .map(|i| GameSpec {
            game_id: i,
            seed: splitmix64(seed0 ^ i),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct GameOutcome {
    pub game_id: u64,
    pub seed: u64,
    pub agent: String,
    pub total: u32,
    pub sheet: Scoresheet,
    pub cache: AgentCacheStats,
}

/// Play one game with a fresh agent.
pub fn play_one(
    agent: &AgentConfig,
    game: GameSpec,
    deterministic_dice: bool,
) -> Result<GameOutcome, EvalError> {
    let mut player = Agent::from_config(agent, game.seed)?;
    let mut dice = if deterministic_dice {
        DiceSource::event_keyed(game.seed)
    } else {
        DiceSource::seeded(game.seed)
    };
    let record = play_game(&mut player, &mut dice).map_err(|source| EvalError::Game {
        game_id: game.game_id,
        seed: game.seed,
        source,
    })?;
    debug!(
        "game {} ({}): {} points",
        game.game_id, record.player, record.total
    );
    Ok(GameOutcome {
        game_id: game.game_id,
        seed: game.seed,
        agent: record.player,
        total: record.total,
        sheet: record.sheet,
        cache: player.cache_stats(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Append per-game and summary events here.
    pub events_path: Option<PathBuf>,
    pub run_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub agent: String,
    pub games: Vec<GameOutcome>,
    pub summary: ScoreSummary,
    pub wall_ms: u64,
}

impl EvalReport {
    pub fn scores(&self) -> Vec<u32> {
        self.games.iter().map(|g| g.total).collect()
    }

    pub fn sheets(&self) -> Vec<Scoresheet> {
        self.games.iter().map(|g| g.sheet).collect()
    }

    pub fn category_medians(&self) -> BTreeMap<Category, f64> {
        category_medians(&self.sheets())
    }
}

pub fn simulate(cfg: &Config) -> Result<EvalReport, EvalError> {
    simulate_with(cfg, &EvalOptions::default())
}

pub fn simulate_with(cfg: &Config, opts: &EvalOptions) -> Result<EvalReport, EvalError> {
    if cfg.eval.games == 0 {
        return Err(EvalError::InvalidConfig("eval.games must be > 0"));
    }
    // Fail on a bad agent config before spawning any work.
    let agent_name = Agent::from_config(&cfg.agent, cfg.eval.seed)?.name().to_string();
    let schedule = eval_schedule(cfg.eval.seed, cfg.eval.games);
    info!(
        "eval: {} games of {agent_name} (seed={}, deterministic_dice={})",
        schedule.len(),
        cfg.eval.seed,
        cfg.eval.deterministic_dice
    );

    let t0 = Instant::now();
    let run = || -> Result<Vec<GameOutcome>, EvalError> {
        schedule
            .par_iter()
            .map(|game| play_one(&cfg.agent, *game, cfg.eval.deterministic_dice))
            .collect()
    };
    let games = match cfg.eval.threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()?
            .install(run)?,
        None => run()?,
    };
    let wall_ms = t0.elapsed().as_millis() as u64;

    let scores: Vec<u32> = games.iter().map(|g| g.total).collect();
    let summary = summarize_scores(&scores);
    info!(
        "eval: {agent_name} mean {:.1} median {:.1} std {:.1} over {} games in {wall_ms} ms",
        summary.mean, summary.median, summary.std, summary.n
    );

    let report = EvalReport {
        agent: agent_name,
        games,
        summary,
        wall_ms,
    };
    if let Some(path) = &opts.events_path {
        write_events(path, &opts.run_id, &report)?;
    }
    Ok(report)
}

fn cache_v1(s: CacheStats) -> CacheStatsV1 {
    CacheStatsV1 {
        hits: s.hits,
        misses: s.misses,
        entries: s.entries as u64,
    }
}

/// Append one `game_finished` line per game, then one `eval_summary` line.
pub fn write_events(path: &Path, run_id: &str, report: &EvalReport) -> Result<(), EvalError> {
    let mut w = NdjsonWriter::open_append(path)?;
    for g in &report.games {
        let rows = Category::ALL
            .into_iter()
            .filter_map(|c| g.sheet.get(c).map(|v| (c.name().to_string(), v)))
            .collect();
        w.write_event(&GameFinishedEventV1 {
            event: GameFinishedEventV1::EVENT,
            ts_ms: now_ms(),
            v: VersionInfoV1::default(),
            run_id: run_id.to_string(),
            game_id: g.game_id,
            game_seed: g.seed,
            agent: g.agent.clone(),
            total: g.total,
            rows,
            score_cache: cache_v1(g.cache.score),
            lock_cache: cache_v1(g.cache.lock),
        })?;
    }
    let s = &report.summary;
    w.write_event(&EvalSummaryEventV1 {
        event: EvalSummaryEventV1::EVENT,
        ts_ms: now_ms(),
        v: VersionInfoV1::default(),
        run_id: run_id.to_string(),
        agent: report.agent.clone(),
        games: s.n,
        mean: s.mean,
        median: s.median,
        std: s.std,
        min: s.min,
        max: s.max,
        wall_ms: report.wall_ms,
    })?;
    w.flush()?;
    Ok(())
}

/// Write per-row medians as a target table readable by `TargetScores::load`.
pub fn write_targets(path: &Path, medians: &BTreeMap<Category, f64>) -> Result<(), EvalError> {
    let bytes = serde_json::to_vec_pretty(medians)?;
    std::fs::write(path, bytes)?;
    Ok(())
}


#[cfg(test)]
mod eval_tests;
