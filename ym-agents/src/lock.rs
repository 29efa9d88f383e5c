//! Lock policies: which dice to keep before the next throw.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use ym_core::{Keep, Scoresheet, Throw};

use crate::cache::CacheStats;
use crate::enumerate::powerset;
use crate::scorer::ThrowScorer;
use crate::search::{LockSearch, SearchConfig};

pub trait LockPolicy: Send {
    /// Short tag used in agent names.
    fn tag(&self) -> String;

    /// Keep-subset of `throw`. Must always be a sub-multiset of the throw.
    fn lock_dice(
        &mut self,
        scorer: &mut ThrowScorer,
        sheet: &Scoresheet,
        throw: Throw,
        is_first_lock: bool,
    ) -> Keep;

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn clear_cache(&mut self) {}
}

/// Uniform choice among the distinct keep-subsets.
pub struct RandomLock {
    rng: ChaCha8Rng,
}

impl RandomLock {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl LockPolicy for RandomLock {
    fn tag(&self) -> String {
        "Random".to_string()
    }

    fn lock_dice(
        &mut self,
        _scorer: &mut ThrowScorer,
        _sheet: &Scoresheet,
        throw: Throw,
        _is_first_lock: bool,
    ) -> Keep {
        powerset(&throw)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Keep::EMPTY)
    }
}

/// Keeps the best-scoring subset from the lock search.
///
/// One-ply always searches depth 1. Two-ply searches depth 2 on the first lock of
/// a round only; the second lock has a single re-throw left.
pub struct SearchLock {
    search: LockSearch,
    two_ply: bool,
}

impl SearchLock {
    pub fn one_ply() -> Self {
        Self {
            search: LockSearch::new(SearchConfig::default()),
            two_ply: false,
        }
    }

    pub fn two_ply(config: SearchConfig) -> Self {
        Self {
            search: LockSearch::new(config),
            two_ply: true,
        }
    }

    pub fn is_two_ply(&self) -> bool {
        self.two_ply
    }

    pub fn search(&self) -> &LockSearch {
        &self.search
    }
}

impl LockPolicy for SearchLock {
    fn tag(&self) -> String {
        if !self.two_ply {
            return "T1".to_string();
        }
        match self.search.config().top_k {
            Some(k) => format!("T2K{k}"),
            None => "T2".to_string(),
        }
    }

    fn lock_dice(
        &mut self,
        scorer: &mut ThrowScorer,
        sheet: &Scoresheet,
        throw: Throw,
        is_first_lock: bool,
    ) -> Keep {
        let recursive = self.two_ply && is_first_lock;
        let table = self.search.lock_scores(scorer, sheet, throw, recursive);
        table
            .best()
            .map(|(keep, _)| keep)
            .unwrap_or_else(|| throw.as_keep())
    }

    fn stats(&self) -> CacheStats {
        self.search.stats()
    }

    fn clear_cache(&mut self) {
        self.search.clear_cache();
    }
}
