//! Yams decision engine.
//!
//! - Throw enumeration and keep-subsets (`enumerate`)
//! - Single-throw scoring policies behind a memo cache (`scorer`, `targets`)
//! - Memoized one-ply / two-ply lock search with optional top-K pruning (`search`)
//! - Lock policies and the `Agent` that composes them into a `ym_core::Player`
//!
//! Caches are owned by one agent and live as long as it does. Run parallel games
//! with one agent per game.

pub mod agent;
pub mod cache;
pub mod enumerate;
pub mod lock;
pub mod scorer;
pub mod search;
pub mod targets;

pub use agent::{eliminate_row, Agent, AgentCacheStats, AgentError};
pub use cache::{CacheStats, MemoCache};
pub use enumerate::{generate_all_throws, num_multisets, powerset};
pub use lock::{LockPolicy, RandomLock, SearchLock};
pub use scorer::{PowerNormalized, RawBest, Scored, ScoringPolicy, TargetRelative, ThrowScorer};
pub use search::{aggregate, mean, median, LockScores, LockSearch, SearchConfig};
pub use targets::{TargetError, TargetScores};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


#[cfg(test)]
mod agent_tests;
