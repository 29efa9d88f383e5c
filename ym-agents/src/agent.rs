//! Agent: a scoring policy and a lock policy composed into a [`Player`].

use log::debug;
use serde::Serialize;
use thiserror::Error;
use ym_core::{
    AgentConfig, Category, Keep, LockConfig, Player, PlayerError, Scoresheet, Throw,
    ELIMINATION_ORDER,
};

use crate::cache::CacheStats;
use crate::lock::{LockPolicy, RandomLock, SearchLock};
use crate::scorer::{Scored, ThrowScorer};
use crate::search::SearchConfig;
use crate::targets::TargetError;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Every row is filled yet a row was requested: the driver kept playing a finished game.
    #[error("no open row left to sacrifice")]
    SheetExhausted,
    #[error(transparent)]
    Targets(#[from] TargetError),
}

/// First open row in [`ELIMINATION_ORDER`].
pub fn eliminate_row(sheet: &Scoresheet) -> Result<Category, AgentError> {
    ELIMINATION_ORDER
        .into_iter()
        .find(|c| !sheet.is_filled(*c))
        .ok_or(AgentError::SheetExhausted)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgentCacheStats {
    pub score: CacheStats,
    pub lock: CacheStats,
}

pub struct Agent {
    name: String,
    scorer: ThrowScorer,
    lock: Box<dyn LockPolicy>,
}

impl Agent {
    /// Agent named after its policies, e.g. `YamsT2K3E` or `YamsT1T_median_YamsT1E`.
    pub fn new(scorer: ThrowScorer, lock: Box<dyn LockPolicy>) -> Self {
        let name = format!("Yams{}{}", lock.tag(), scorer.tag());
        Self::named(name, scorer, lock)
    }

    pub fn named(name: impl Into<String>, scorer: ThrowScorer, lock: Box<dyn LockPolicy>) -> Self {
        Self {
            name: name.into(),
            scorer,
            lock,
        }
    }

    /// Build from config. `seed` only feeds the random lock policy.
    pub fn from_config(config: &AgentConfig, seed: u64) -> Result<Self, AgentError> {
        let scorer = ThrowScorer::from_config(&config.scorer)?;
        let lock: Box<dyn LockPolicy> = match config.lock {
            LockConfig::Random => Box::new(RandomLock::new(seed)),
            LockConfig::Greedy => Box::new(SearchLock::one_ply()),
            LockConfig::Lookahead {
                top_k,
                deep_aggregate,
            } => Box::new(SearchLock::two_ply(SearchConfig {
                top_k,
                deep_aggregate,
            })),
        };
        Ok(match &config.name {
            Some(name) => Self::named(name.clone(), scorer, lock),
            None => Self::new(scorer, lock),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score_throw(&mut self, sheet: &Scoresheet, throw: Throw) -> Scored {
        self.scorer.score_throw(sheet, throw)
    }

    pub fn lock_dice(&mut self, sheet: &Scoresheet, throw: Throw, is_first_lock: bool) -> Keep {
        self.lock
            .lock_dice(&mut self.scorer, sheet, throw, is_first_lock)
    }

    /// The scorer's pick, or the elimination row when that pick is already filled.
    pub fn choose_row(&mut self, sheet: &Scoresheet, throw: Throw) -> Result<Category, AgentError> {
        let scored = self.scorer.score_throw(sheet, throw);
        if !sheet.is_filled(scored.category) {
            return Ok(scored.category);
        }
        let row = eliminate_row(sheet)?;
        debug!(
            "{}: {} already filled for {throw}, sacrificing {row}",
            self.name, scored.category
        );
        Ok(row)
    }

    pub fn cache_stats(&self) -> AgentCacheStats {
        AgentCacheStats {
            score: self.scorer.stats(),
            lock: self.lock.stats(),
        }
    }

    /// Drop every memoized result, e.g. between games when an agent is reused.
    pub fn reset_caches(&mut self) {
        self.scorer.clear_cache();
        self.lock.clear_cache();
    }
}

impl Player for Agent {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn lock_dice(&mut self, sheet: &Scoresheet, throw: Throw, is_first_lock: bool) -> Keep {
        Agent::lock_dice(self, sheet, throw, is_first_lock)
    }

    fn choose_row(&mut self, sheet: &Scoresheet, throw: Throw) -> Result<Category, PlayerError> {
        Ok(Agent::choose_row(self, sheet, throw)?)
    }

    fn on_game_end(&mut self, sheet: &Scoresheet) {
        let stats = self.cache_stats();
        debug!(
            "{} finished with {}: score cache {}/{} hits ({} entries), lock cache {}/{} hits ({} entries)",
            self.name,
            sheet.total(),
            stats.score.hits,
            stats.score.hits + stats.score.misses,
            stats.score.entries,
            stats.lock.hits,
            stats.lock.hits + stats.lock.misses,
            stats.lock.entries,
        );
    }
}
