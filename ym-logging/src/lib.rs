//! ym-logging: logger setup, NDJSON events and run manifests.
//!
//! Events are append-only NDJSON, one object per line, so a crashed run still
//! leaves every completed game readable.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Eval manifest schema version.
pub const EVAL_MANIFEST_VERSION: u32 = 1;

/// Scoring rules the events were produced under.
pub const RULESET_ID: &str = "yams_fr_v1";

/// Initialise console logging from `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalManifestV1 {
    pub eval_manifest_version: u32,

    pub run_id: String,
    pub created_ts_ms: u64,
    pub ruleset_id: String,

    // Hashes for reproducibility.
    pub git_hash: Option<String>,
    pub config_hash: Option<String>,

    pub agent: String,
    pub games: u32,
    pub seed: u64,
    pub deterministic_dice: bool,
    pub events_path: Option<String>,

    // Filled in when the run finishes.
    pub games_completed: u64,
    pub mean_score: Option<f64>,
    pub finished_ts_ms: Option<u64>,
}

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

pub fn hash_config_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn try_git_hash() -> Option<String> {
    use std::process::Command;

    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8(out.stdout).ok()?;
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

pub fn read_manifest(path: impl AsRef<Path>) -> Result<EvalManifestV1, NdjsonError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice::<EvalManifestV1>(&bytes)?)
}

/// Write to `<path>.tmp` then rename, so readers never see a half-written file.
pub fn write_manifest_atomic(path: impl AsRef<Path>, m: &EvalManifestV1) -> Result<(), NdjsonError> {
    let path = path.as_ref();
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(m)?;
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionInfoV1 {
    pub ruleset_id: &'static str,
    pub crate_version: &'static str,
}

impl Default for VersionInfoV1 {
    fn default() -> Self {
        Self {
            ruleset_id: RULESET_ID,
            crate_version: VERSION,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStatsV1 {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

/// One finished game.
#[derive(Debug, Clone, Serialize)]
pub struct GameFinishedEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub run_id: String,
    pub game_id: u64,
    pub game_seed: u64,
    pub agent: String,

    pub total: u32,
    /// Final value of every row, keyed by row name.
    pub rows: Vec<(String, u8)>,

    pub score_cache: CacheStatsV1,
    pub lock_cache: CacheStatsV1,
}

impl GameFinishedEventV1 {
    pub const EVENT: &'static str = "game_finished";
}

/// Score distribution over a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct EvalSummaryEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub run_id: String,
    pub agent: String,
    pub games: u64,

    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: u32,
    pub max: u32,
    pub wall_ms: u64,
}

impl EvalSummaryEventV1 {
    pub const EVENT: &'static str = "eval_summary";
}

#[derive(Debug, Error)]
pub enum NdjsonError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}

/// Parse every complete JSON line, skipping blank or truncated ones.
pub fn read_ndjson_lenient(path: impl AsRef<Path>) -> Result<Vec<serde_json::Value>, NdjsonError> {
    let s = std::fs::read_to_string(path)?;
    Ok(s.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect())
}
