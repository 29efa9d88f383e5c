//! Lock-decision search.
//!
//! For a sheet and a throw, every distinct keep-subset gets an aggregate score:
//!
//! - one-ply: mean of the scorer's value over every distinct re-throw of the keep;
//! - two-ply: the one-ply table is computed first and optionally pruned to its
//!   `top_k` best keeps. For each retained keep, every re-throw gets its own
//!   one-ply table and all of those scores are pooled into one aggregate
//!   (median by default). Pruned keeps keep their one-ply score, so the table
//!   always covers every keep-subset.
//!
//! Both plies are memoized on (sheet, throw, two-ply flag). Re-throws are
//! enumerated as distinct outcomes without weighting, see
//! [`generate_all_throws`].

use std::sync::Arc;

use log::trace;
use ym_core::{Aggregate, Keep, Scoresheet, Throw};

use crate::cache::{lock_key, CacheStats, LockKey, MemoCache};
use crate::enumerate::{generate_all_throws, powerset};
use crate::scorer::ThrowScorer;

/// Aggregate score per keep-subset, in candidate order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LockScores {
    entries: Vec<(Keep, f64)>,
}

impl LockScores {
    pub fn get(&self, keep: &Keep) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == keep).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Keep, f64)> + '_ {
        self.entries.iter()
    }

    pub fn keeps(&self) -> impl Iterator<Item = Keep> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry holding the maximal score.
    pub fn best(&self) -> Option<(Keep, f64)> {
        let mut best: Option<(Keep, f64)> = None;
        for &(k, v) in &self.entries {
            if best.map_or(true, |(_, b)| v > b) {
                best = Some((k, v));
            }
        }
        best
    }

    /// Entries scoring at least the `k`-th highest value; ties at the cut are kept.
    /// `None`, or a table with at most `k` entries, keeps everything.
    pub fn top_k(&self, k: Option<usize>) -> Vec<Keep> {
        match k {
            Some(k) if k > 0 && self.entries.len() > k => {
                let mut sorted: Vec<f64> = self.values().collect();
                sorted.sort_by(|a, b| b.total_cmp(a));
                let cut = sorted[k - 1];
                self.entries
                    .iter()
                    .filter(|(_, v)| *v >= cut)
                    .map(|(keep, _)| *keep)
                    .collect()
            }
            _ => self.keeps().collect(),
        }
    }
}

impl FromIterator<(Keep, f64)> for LockScores {
    fn from_iter<I: IntoIterator<Item = (Keep, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Two-ply search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Keeps searched two-ply; `None` searches all of them.
    pub top_k: Option<usize>,
    /// Statistic over the pooled second-ply scores.
    pub deep_aggregate: Aggregate,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: None,
            deep_aggregate: Aggregate::Median,
        }
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; the two middle values are averaged for even lengths.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut v = values.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    let n = v.len();
    if n % 2 == 1 {
        v[n / 2]
    } else {
        (v[n / 2 - 1] + v[n / 2]) / 2.0
    }
}

pub fn aggregate(values: &[f64], how: Aggregate) -> f64 {
    match how {
        Aggregate::Mean => mean(values),
        Aggregate::Median => median(values),
    }
}

/// Memoized lock search. One instance per agent; not shared across threads.
pub struct LockSearch {
    config: SearchConfig,
    cache: MemoCache<LockKey, Arc<LockScores>>,
}

impl LockSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            cache: MemoCache::new(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Score table for every keep of `throw`; two-ply when `recursive`.
    pub fn lock_scores(
        &mut self,
        scorer: &mut ThrowScorer,
        sheet: &Scoresheet,
        throw: Throw,
        recursive: bool,
    ) -> Arc<LockScores> {
        let key = lock_key(sheet, &throw, recursive);
        if let Some(hit) = self.cache.lookup(&key) {
            return hit;
        }
        let table = if recursive {
            self.two_ply(scorer, sheet, throw)
        } else {
            one_ply(scorer, sheet, throw)
        };
        let table = Arc::new(table);
        self.cache.insert(key, Arc::clone(&table));
        table
    }

    fn two_ply(&mut self, scorer: &mut ThrowScorer, sheet: &Scoresheet, throw: Throw) -> LockScores {
        let shallow = self.lock_scores(scorer, sheet, throw, false);
        let candidates = shallow.top_k(self.config.top_k);
        trace!(
            "two-ply on {throw}: {} of {} keeps retained",
            candidates.len(),
            shallow.len()
        );

        // Pruned keeps stay in the table with their one-ply value.
        let mut entries = shallow.entries.clone();
        let mut pool = Vec::new();
        for (keep, value) in entries.iter_mut() {
            if !candidates.contains(&*keep) {
                continue;
            }
            pool.clear();
            for rethrow in generate_all_throws(&*keep) {
                let inner = self.lock_scores(scorer, sheet, rethrow, false);
                pool.extend(inner.values());
            }
            *value = aggregate(&pool, self.config.deep_aggregate);
        }
        LockScores { entries }
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

fn one_ply(scorer: &mut ThrowScorer, sheet: &Scoresheet, throw: Throw) -> LockScores {
    let mut values = Vec::new();
    let entries = powerset(&throw)
        .into_iter()
        .map(|keep| {
            values.clear();
            values.extend(
                generate_all_throws(&keep)
                    .into_iter()
                    .map(|t| scorer.score_throw(sheet, t).value),
            );
            (keep, mean(&values))
        })
        .collect();
    LockScores { entries }
}
