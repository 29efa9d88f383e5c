//! yams: CLI for playing and evaluating Yams agents.
//!
//! Subcommands:
//! - play      one verbose game
//! - eval      batch simulation with summary, histogram and optional run directory
//! - targets   per-row medians of a batch, written as a target table

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use log::info;
use ym_agents::Agent;
use ym_core::{play_game, Config, DiceSource};
use ym_eval::{histogram, simulate_with, write_targets, EvalOptions, EvalReport};
use ym_logging::{
    hash_config_bytes, now_ms, try_git_hash, write_manifest_atomic, EvalManifestV1,
    EVAL_MANIFEST_VERSION, RULESET_ID,
};

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "yams", version, about = "Play and evaluate Yams agents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a single game and print every round
    Play(PlayArgs),
    /// Simulate many games and summarize the scores
    Eval(EvalArgs),
    /// Derive a per-row median target table from simulated games
    Targets(TargetsArgs),
}

#[derive(Args, Debug)]
struct AgentArgs {
    /// YAML config (agent + eval sections); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base seed (overrides eval.seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Event-keyed dice: same seed gives the same dice to every agent
    #[arg(long)]
    deterministic: bool,
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    agent: AgentArgs,

    /// Print the game record as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct EvalArgs {
    #[command(flatten)]
    agent: AgentArgs,

    /// Number of games (overrides eval.games)
    #[arg(long)]
    games: Option<u32>,

    /// Worker threads (overrides eval.threads)
    #[arg(long)]
    threads: Option<usize>,

    /// Run directory: receives run.json and eval.ndjson
    #[arg(long)]
    out: Option<PathBuf>,

    /// Skip printing the histogram
    #[arg(long)]
    no_hist: bool,
}

#[derive(Args, Debug)]
struct TargetsArgs {
    #[command(flatten)]
    agent: AgentArgs,

    /// Number of games (overrides eval.games)
    #[arg(long)]
    games: Option<u32>,

    /// Output JSON file, e.g. target_median_YamsT1E.json
    #[arg(long)]
    out: PathBuf,
}

fn load_config(args: &AgentArgs) -> Result<Config, Box<dyn Error>> {
    let mut cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        cfg.eval.seed = seed;
    }
    if args.deterministic {
        cfg.eval.deterministic_dice = true;
    }
    Ok(cfg)
}

fn cmd_play(args: PlayArgs) -> CliResult {
    let cfg = load_config(&args.agent)?;
    let mut agent = Agent::from_config(&cfg.agent, cfg.eval.seed)?;
    let mut dice = if cfg.eval.deterministic_dice {
        DiceSource::event_keyed(cfg.eval.seed)
    } else {
        DiceSource::seeded(cfg.eval.seed)
    };
    let record = play_game(&mut agent, &mut dice)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("{} (seed {})", record.player, cfg.eval.seed);
    for r in &record.rounds {
        let mut line = format!("Round {:>2}:", r.round + 1);
        for (i, t) in r.throws.iter().enumerate() {
            line.push_str(&format!(" {t:?}"));
            if let Some(k) = r.keeps.get(i) {
                line.push_str(&format!(" keep {k:?} ->"));
            }
        }
        line.push_str(&format!(" => {} = {}", r.row, r.points));
        if let Some(b) = r.bonus {
            line.push_str(&format!(" (bonus {b})"));
        }
        println!("{line}");
    }
    println!();
    println!("{}", record.sheet);
    println!("Total: {}", record.total);
    Ok(())
}

fn new_manifest(cfg: &Config, agent: &str, events_path: Option<&Path>) -> Result<EvalManifestV1, Box<dyn Error>> {
    let created = now_ms();
    Ok(EvalManifestV1 {
        eval_manifest_version: EVAL_MANIFEST_VERSION,
        run_id: format!("eval-{created}"),
        created_ts_ms: created,
        ruleset_id: RULESET_ID.to_string(),
        git_hash: try_git_hash(),
        config_hash: Some(hash_config_bytes(&serde_json::to_vec(cfg)?)),
        agent: agent.to_string(),
        games: cfg.eval.games,
        seed: cfg.eval.seed,
        deterministic_dice: cfg.eval.deterministic_dice,
        events_path: events_path.map(|p| p.display().to_string()),
        games_completed: 0,
        mean_score: None,
        finished_ts_ms: None,
    })
}

fn print_report(report: &EvalReport, no_hist: bool) {
    let s = &report.summary;
    println!();
    println!("Evaluation:");
    println!("  - Agent: {}", report.agent);
    println!("  - Games: {}", s.n);
    println!(
        "  - Score: mean={:.2} (±{:.2}), median={}, std={:.2}, min={}, max={}",
        s.mean, s.ci95, s.median, s.std, s.min, s.max
    );
    let bonus_games = report
        .games
        .iter()
        .filter(|g| g.sheet.get(ym_core::Category::Bonus) == Some(ym_core::BONUS_POINTS))
        .count();
    println!(
        "  - Upper bonus rate: {:.1}%",
        100.0 * bonus_games as f64 / s.n.max(1) as f64
    );
    println!("  - Wall time: {} ms", report.wall_ms);

    if !no_hist {
        println!();
        print!("{}", histogram(&report.scores(), 10, 40));
    }
}

fn cmd_eval(args: EvalArgs) -> CliResult {
    let mut cfg = load_config(&args.agent)?;
    if let Some(games) = args.games {
        cfg.eval.games = games;
    }
    if let Some(threads) = args.threads {
        cfg.eval.threads = Some(threads);
    }
    cfg.validate()?;

    let mut opts = EvalOptions::default();
    let mut manifest = None;
    if let Some(dir) = &args.out {
        fs::create_dir_all(dir)?;
        let events = dir.join("eval.ndjson");
        let agent = Agent::from_config(&cfg.agent, cfg.eval.seed)?;
        let m = new_manifest(&cfg, agent.name(), Some(&events))?;
        write_manifest_atomic(dir.join("run.json"), &m)?;
        info!("run directory {} (run_id {})", dir.display(), m.run_id);
        opts.run_id = m.run_id.clone();
        opts.events_path = Some(events);
        manifest = Some(m);
    }

    let report = simulate_with(&cfg, &opts)?;

    if let (Some(dir), Some(mut m)) = (&args.out, manifest) {
        m.games_completed = report.games.len() as u64;
        m.mean_score = Some(report.summary.mean);
        m.finished_ts_ms = Some(now_ms());
        write_manifest_atomic(dir.join("run.json"), &m)?;
    }

    print_report(&report, args.no_hist);
    Ok(())
}

fn cmd_targets(args: TargetsArgs) -> CliResult {
    let mut cfg = load_config(&args.agent)?;
    if let Some(games) = args.games {
        cfg.eval.games = games;
    }
    let report = simulate_with(&cfg, &EvalOptions::default())?;
    let medians = report.category_medians();
    write_targets(&args.out, &medians)?;

    println!(
        "Wrote median targets of {} over {} games to {}",
        report.agent,
        report.summary.n,
        args.out.display()
    );
    for (cat, v) in &medians {
        println!("  {:<13} {:>6.1}", cat.name(), v);
    }
    Ok(())
}

fn main() {
    ym_logging::init();
    let cli = Cli::parse();

    let res = match cli.command {
        Command::Play(args) => cmd_play(args),
        Command::Eval(args) => cmd_eval(args),
        Command::Targets(args) => cmd_targets(args),
    };
    if let Err(e) = res {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
