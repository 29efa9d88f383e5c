//! ym-core: Yams rules, scoresheet, dice, round driver and configuration.

pub mod category;
pub mod chance;
pub mod config;
pub mod dice;
pub mod game;
pub mod scoring;
pub mod sheet;

pub use category::{Category, UnknownCategory, ELIMINATION_ORDER, NUM_CATS};
pub use chance::{splitmix64, DiceSource, EventKey};
pub use config::{
    Aggregate, AgentConfig, Config, ConfigError, EvalConfig, LockConfig, ScorerConfig,
};
pub use dice::{DiceError, Keep, Throw, NUM_DICE};
pub use game::{
    play_game, play_round, GameError, GameRecord, Player, PlayerError, RoundPhase, RoundRecord,
};
pub use scoring::{realized_points, scores_for_throw, sheet_points, SheetPoints};
pub use sheet::{sheet_key, Scoresheet, SheetError, SheetKey, BONUS_POINTS, BONUS_THRESHOLD};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }
}
