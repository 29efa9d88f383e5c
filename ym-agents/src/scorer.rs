//! Single-throw scoring policies.
//!
//! A policy looks at the achievable points of every choosable row
//! ([`ym_core::sheet_points`]) and picks one. [`ThrowScorer`] wraps a policy with
//! its memo cache; the lock search and the row choice both go through it.

use serde::Serialize;
use ym_core::{sheet_points, Category, ScorerConfig, Scoresheet, SheetPoints, Throw};

use crate::cache::{score_key, CacheStats, MemoCache, ScoreKey};
use crate::targets::{TargetError, TargetScores};

/// Outcome of scoring one throw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scored {
    pub category: Category,
    /// Achievable points, bonus projection included.
    pub points: u32,
    /// Policy figure used for comparison and aggregation.
    pub value: f64,
}

/// Picks one row for a throw.
pub trait ScoringPolicy: Send {
    /// Short tag appended to agent names ("" for raw-best).
    fn tag(&self) -> String;

    fn score(&self, sheet: &Scoresheet, throw: Throw) -> Scored;
}

fn choosable() -> impl Iterator<Item = Category> {
    Category::ALL.into_iter().filter(|c| c.is_choosable())
}

/// Highest policy value; ties go to higher raw points, then to the earlier row.
fn pick_by_value(points: &SheetPoints, value: impl Fn(Category, u32) -> f64) -> Scored {
    let mut best: Option<Scored> = None;
    for cat in choosable() {
        let pts = points[cat.index()];
        let v = value(cat, pts);
        let better = match best {
            None => true,
            Some(b) => v > b.value || (v == b.value && pts > b.points),
        };
        if better {
            best = Some(Scored {
                category: cat,
                points: pts,
                value: v,
            });
        }
    }
    best.unwrap_or(Scored {
        category: Category::Chance,
        points: 0,
        value: 0.0,
    })
}

/// Maximum raw points. Ties go to the row latest in sheet order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBest;

impl ScoringPolicy for RawBest {
    fn tag(&self) -> String {
        String::new()
    }

    fn score(&self, sheet: &Scoresheet, throw: Throw) -> Scored {
        let points = sheet_points(sheet, throw);
        let (category, pts) = choosable()
            .map(|c| (c, points[c.index()]))
            .fold((Category::One, 0u32), |best, cur| {
                if cur.1 >= best.1 {
                    cur
                } else {
                    best
                }
            });
        Scored {
            category,
            points: pts,
            value: pts as f64,
        }
    }
}

/// `points^power / max_points(row)`: rewards filling a row close to its ceiling.
#[derive(Debug, Clone)]
pub struct PowerNormalized {
    power: f64,
    table: Vec<f64>,
}

impl PowerNormalized {
    const TABLE_LEN: u32 = 100;

    pub fn new(power: f64) -> Self {
        let table = (0..Self::TABLE_LEN).map(|x| (x as f64).powf(power)).collect();
        Self { power, table }
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    fn pow(&self, pts: u32) -> f64 {
        match self.table.get(pts as usize) {
            Some(v) => *v,
            None => (pts as f64).powf(self.power),
        }
    }
}

impl ScoringPolicy for PowerNormalized {
    fn tag(&self) -> String {
        "E".to_string()
    }

    fn score(&self, sheet: &Scoresheet, throw: Throw) -> Scored {
        let points = sheet_points(sheet, throw);
        pick_by_value(&points, |cat, pts| {
            self.pow(pts) / cat.max_points() as f64
        })
    }
}

/// `2 * points - target(row)`.
#[derive(Debug, Clone)]
pub struct TargetRelative {
    targets: TargetScores,
}

impl TargetRelative {
    pub fn new(targets: TargetScores) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> &TargetScores {
        &self.targets
    }
}

impl ScoringPolicy for TargetRelative {
    fn tag(&self) -> String {
        format!("T_{}", self.targets.label())
    }

    fn score(&self, sheet: &Scoresheet, throw: Throw) -> Scored {
        let points = sheet_points(sheet, throw);
        pick_by_value(&points, |cat, pts| 2.0 * pts as f64 - self.targets.get(cat))
    }
}

/// A scoring policy plus its (sheet, throw) memo cache.
pub struct ThrowScorer {
    policy: Box<dyn ScoringPolicy>,
    cache: Option<MemoCache<ScoreKey, Scored>>,
}

impl ThrowScorer {
    pub fn new(policy: Box<dyn ScoringPolicy>, memoize: bool) -> Self {
        Self {
            policy,
            cache: memoize.then(MemoCache::new),
        }
    }

    pub fn raw_best(memoize: bool) -> Self {
        Self::new(Box::new(RawBest), memoize)
    }

    pub fn power_normalized(power: f64) -> Self {
        Self::new(Box::new(PowerNormalized::new(power)), true)
    }

    pub fn target_relative(targets: TargetScores) -> Self {
        Self::new(Box::new(TargetRelative::new(targets)), true)
    }

    /// Build the scorer described by `config`, loading target tables from disk.
    pub fn from_config(config: &ScorerConfig) -> Result<Self, TargetError> {
        Ok(match config {
            ScorerConfig::RawBest { memoize } => Self::raw_best(*memoize),
            ScorerConfig::PowerNormalized { power } => Self::power_normalized(*power),
            ScorerConfig::TargetRelative { targets } => {
                Self::target_relative(TargetScores::load(targets)?)
            }
        })
    }

    pub fn tag(&self) -> String {
        self.policy.tag()
    }

    pub fn score_throw(&mut self, sheet: &Scoresheet, throw: Throw) -> Scored {
        let Some(cache) = self.cache.as_mut() else {
            return self.policy.score(sheet, throw);
        };
        let key = score_key(sheet, &throw);
        if let Some(hit) = cache.lookup(&key) {
            return hit;
        }
        let scored = self.policy.score(sheet, throw);
        cache.insert(key, scored);
        scored
    }

    pub fn is_memoized(&self) -> bool {
        self.cache.is_some()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.as_ref().map(MemoCache::stats).unwrap_or_default()
    }

    pub fn clear_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }
}
