//! Configuration schema for agents and evaluation runs.
//!
//! Loaded from YAML. Every section has defaults so a config file only needs the
//! fields it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Agent under evaluation.
    #[serde(default)]
    pub agent: AgentConfig,
    /// Batch simulation settings.
    #[serde(default)]
    pub eval: EvalConfig,
}

/// Agent composition: one scoring policy plus one lock policy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Optional display name; derived from the policies when absent.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scorer: ScorerConfig,
    #[serde(default)]
    pub lock: LockConfig,
}

/// How a single throw is scored against the sheet.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScorerConfig {
    /// Highest raw points; ties go to the row latest in sheet order.
    RawBest {
        #[serde(default)]
        memoize: bool,
    },
    /// `points^power / max_points(row)`; ties go to the higher raw points.
    PowerNormalized {
        #[serde(default = "default_power")]
        power: f64,
    },
    /// `2 * points - target(row)` against an external target table (JSON).
    TargetRelative { targets: PathBuf },
}

pub fn default_power() -> f64 {
    1.5
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig::PowerNormalized {
            power: default_power(),
        }
    }
}

/// How dice are kept between throws.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LockConfig {
    /// Uniform over the distinct keep-subsets.
    Random,
    /// One-ply search on both locks.
    Greedy,
    /// Two-ply search on the first lock, one-ply on the second.
    Lookahead {
        /// Only the `top_k` best one-ply candidates are searched two-ply.
        /// `None` searches every candidate.
        #[serde(default = "default_top_k")]
        top_k: Option<usize>,
        #[serde(default)]
        deep_aggregate: Aggregate,
    },
}

fn default_top_k() -> Option<usize> {
    Some(3)
}

impl Default for LockConfig {
    fn default() -> Self {
        LockConfig::Lookahead {
            top_k: default_top_k(),
            deep_aggregate: Aggregate::default(),
        }
    }
}

/// Statistic used to fold many outcome scores into one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Mean,
    #[default]
    Median,
}

/// Batch simulation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EvalConfig {
    /// Number of games to play.
    #[serde(default = "default_eval_games")]
    pub games: u32,
    /// Base seed; per-game seeds are derived from it.
    #[serde(default)]
    pub seed: u64,
    /// Use event-keyed dice so different agents see common random numbers.
    #[serde(default)]
    pub deterministic_dice: bool,
    /// Worker threads (rayon). `None` uses the global pool.
    #[serde(default)]
    pub threads: Option<usize>,
}

fn default_eval_games() -> u32 {
    100
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            games: default_eval_games(),
            seed: 0,
            deterministic_dice: false,
            threads: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// Relative target-table paths are resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;
        if let ScorerConfig::TargetRelative { targets } = &mut config.agent.scorer {
            if targets.is_relative() {
                if let Some(dir) = path.parent() {
                    *targets = dir.join(&*targets);
                }
            }
        }
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.agent.validate()?;
        if self.eval.threads == Some(0) {
            return Err(ConfigError::Invalid("eval.threads must be > 0".into()));
        }
        Ok(())
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let ScorerConfig::PowerNormalized { power } = self.scorer {
            if !power.is_finite() || power <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "agent.scorer.power must be finite and > 0, got {power}"
                )));
            }
        }
        if let LockConfig::Lookahead { top_k: Some(0), .. } = self.lock {
            return Err(ConfigError::Invalid(
                "agent.lock.top_k must be > 0 (omit it to search every candidate)".into(),
            ));
        }
        Ok(())
    }
}
