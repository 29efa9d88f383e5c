//! Dice sources for the round driver.
//!
//! Two modes:
//! - pseudorandom dice from a seeded ChaCha8 stream;
//! - deterministic, event-keyed dice: outcomes are defined by (game seed, round, roll)
//!   rather than by evolving RNG state, so two agents facing the same seed see the
//!   same dice whenever they reroll the same number of dice.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

use crate::dice::NUM_DICE;

/// Structural event key for deterministic dice generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventKey {
    pub game_seed: u64,
    pub round_idx: u8,
    /// 0 for the opening throw, 1 and 2 for the rerolls.
    pub roll_idx: u8,
}

/// SplitMix64 step (fast, deterministic).
pub fn splitmix64_next(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// One SplitMix64 output for a seed; used to derive independent per-game seeds.
pub fn splitmix64(seed: u64) -> u64 {
    let mut s = seed;
    splitmix64_next(&mut s)
}

fn mix_seed(key: EventKey) -> u64 {
    // Fixed, stable mixing. Avoid std Hash/RandomState.
    let mut x = key.game_seed;
    x ^= (key.round_idx as u64).wrapping_mul(0xA5A35625E4F7C1AD);
    x ^= (key.roll_idx as u64).wrapping_mul(0xD6E8FEB86659FD93);
    splitmix64(x)
}

/// Deterministically generate 5 dice for the given event key.
pub fn roll5(key: EventKey) -> [u8; NUM_DICE] {
    let mut state = mix_seed(key);
    let mut out = [0u8; NUM_DICE];
    for o in &mut out {
        let r = splitmix64_next(&mut state);
        *o = ((r % 6) + 1) as u8;
    }
    out
}

/// How dice are generated for a game.
pub enum DiceSource {
    /// Deterministic, event-keyed dice stream. Rolling `k` dice takes the first `k`
    /// values of the event's sequence.
    EventKeyed { game_seed: u64 },
    /// Pseudorandom dice stream.
    Rng { rng: Box<ChaCha8Rng> },
}

impl DiceSource {
    pub fn event_keyed(game_seed: u64) -> Self {
        DiceSource::EventKeyed { game_seed }
    }

    pub fn seeded(seed: u64) -> Self {
        DiceSource::Rng {
            rng: Box::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Roll `n` dice (unsorted) for the given round/roll.
    ///
    /// # Panics
    /// Panics if `n > 5`.
    pub fn roll(&mut self, n: usize, round_idx: u8, roll_idx: u8) -> Vec<u8> {
        assert!(n <= NUM_DICE, "cannot roll {} dice", n);
        match self {
            DiceSource::EventKeyed { game_seed } => {
                let key = EventKey {
                    game_seed: *game_seed,
                    round_idx,
                    roll_idx,
                };
                roll5(key)[..n].to_vec()
            }
            DiceSource::Rng { rng } => (0..n).map(|_| rng.gen_range(1..=6)).collect(),
        }
    }
}
