//! Dice values: a full throw and the subsets kept between throws.
//!
//! Both types are canonical (sorted ascending) so that equal multisets compare,
//! hash and cache identically regardless of the order the dice landed in.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

pub const NUM_DICE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("expected at most {max} dice, got {got}")]
    TooMany { max: usize, got: usize },
    #[error("die value {0} out of range 1..=6")]
    FaceOutOfRange(u8),
    #[error("keep {keep} is not a sub-multiset of throw {throw}")]
    NotSubset { keep: Keep, throw: Throw },
}

/// Five dice, sorted ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Throw([u8; NUM_DICE]);

impl Throw {
    /// Validate and sort five die values.
    pub fn new(mut dice: [u8; NUM_DICE]) -> Result<Throw, DiceError> {
        for &d in &dice {
            if !(1..=6).contains(&d) {
                return Err(DiceError::FaceOutOfRange(d));
            }
        }
        dice.sort_unstable();
        Ok(Throw(dice))
    }

    /// Combine kept dice with freshly rolled ones.
    ///
    /// # Panics
    /// Panics if the dice do not add up to five or a value is outside 1..=6.
    pub fn from_parts(kept: &[u8], rolled: &[u8]) -> Throw {
        assert_eq!(
            kept.len() + rolled.len(),
            NUM_DICE,
            "kept {:?} + rolled {:?} must be 5 dice",
            kept,
            rolled
        );
        let mut dice = [0u8; NUM_DICE];
        for (slot, &d) in dice.iter_mut().zip(kept.iter().chain(rolled)) {
            assert!((1..=6).contains(&d), "die out of range: {}", d);
            *slot = d;
        }
        dice.sort_unstable();
        Throw(dice)
    }

    #[inline]
    pub fn dice(&self) -> [u8; NUM_DICE] {
        self.0
    }

    /// counts[i] = number of dice showing face i+1.
    pub fn counts(&self) -> [u8; 6] {
        let mut counts = [0u8; 6];
        for &d in &self.0 {
            counts[(d - 1) as usize] += 1;
        }
        counts
    }

    pub fn sum(&self) -> u32 {
        self.0.iter().map(|&d| d as u32).sum()
    }

    /// Keep the dice whose bit is set in `mask`; bit `i` selects `dice()[i]`.
    pub fn keep_mask(&self, mask: u8) -> Keep {
        debug_assert!(mask < 32);
        let mut out = Keep::EMPTY;
        for (i, &d) in self.0.iter().enumerate() {
            if mask & (1 << i) != 0 {
                out.dice[out.len as usize] = d;
                out.len += 1;
            }
        }
        // Selecting from sorted dice preserves order.
        out
    }

    /// Keeping all five dice.
    pub fn as_keep(&self) -> Keep {
        Keep {
            dice: self.0,
            len: NUM_DICE as u8,
        }
    }

    /// Compact 15-bit encoding (3 bits per die), stable across runs.
    pub fn key(&self) -> u16 {
        self.0
            .iter()
            .enumerate()
            .fold(0u16, |acc, (i, &d)| acc | ((d as u16) << (3 * i)))
    }
}

impl fmt::Display for Throw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Sorted sub-multiset of 0..=5 dice set aside between throws.
///
/// Unused slots are always zero so derived equality and hashing only see the
/// kept values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keep {
    dice: [u8; NUM_DICE],
    len: u8,
}

impl Keep {
    pub const EMPTY: Keep = Keep {
        dice: [0; NUM_DICE],
        len: 0,
    };

    pub fn new(values: &[u8]) -> Result<Keep, DiceError> {
        if values.len() > NUM_DICE {
            return Err(DiceError::TooMany {
                max: NUM_DICE,
                got: values.len(),
            });
        }
        let mut out = Keep::EMPTY;
        for &d in values {
            if !(1..=6).contains(&d) {
                return Err(DiceError::FaceOutOfRange(d));
            }
            out.dice[out.len as usize] = d;
            out.len += 1;
        }
        out.dice[..out.len as usize].sort_unstable();
        Ok(out)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.dice[..self.len as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of dice left to roll.
    pub fn to_roll(&self) -> usize {
        NUM_DICE - self.len()
    }

    pub fn counts(&self) -> [u8; 6] {
        let mut counts = [0u8; 6];
        for &d in self.as_slice() {
            counts[(d - 1) as usize] += 1;
        }
        counts
    }

    /// True if every kept die can be taken from `throw`.
    pub fn is_subset_of(&self, throw: &Throw) -> bool {
        let have = throw.counts();
        self.counts().iter().zip(have.iter()).all(|(k, h)| k <= h)
    }

    /// Checked form of [`Keep::is_subset_of`].
    pub fn check_subset(&self, throw: &Throw) -> Result<(), DiceError> {
        if self.is_subset_of(throw) {
            Ok(())
        } else {
            Err(DiceError::NotSubset {
                keep: *self,
                throw: *throw,
            })
        }
    }
}

impl PartialOrd for Keep {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keep {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl fmt::Display for Keep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throw_is_sorted_and_validated() {
        let t = Throw::new([6, 1, 4, 1, 3]).unwrap();
        assert_eq!(t.dice(), [1, 1, 3, 4, 6]);
        assert_eq!(Throw::new([0, 1, 2, 3, 4]), Err(DiceError::FaceOutOfRange(0)));
        assert_eq!(Throw::new([1, 2, 3, 4, 7]), Err(DiceError::FaceOutOfRange(7)));
    }

    #[test]
    fn keep_mask_bit_mapping() {
        let t = Throw::new([1, 2, 3, 4, 6]).unwrap();
        assert_eq!(t.keep_mask(0b00001).as_slice(), &[1]);
        assert_eq!(t.keep_mask(0b10001).as_slice(), &[1, 6]);
        assert!(t.keep_mask(0).is_empty());
        assert_eq!(t.keep_mask(0b11111), t.as_keep());
    }

    #[test]
    fn keep_subset_respects_multiplicity() {
        let t = Throw::new([2, 2, 3, 5, 5]).unwrap();
        assert!(Keep::new(&[2, 2]).unwrap().is_subset_of(&t));
        assert!(Keep::new(&[5, 2, 5]).unwrap().is_subset_of(&t));
        assert!(!Keep::new(&[2, 2, 2]).unwrap().is_subset_of(&t));
        assert!(!Keep::new(&[4]).unwrap().is_subset_of(&t));
        assert!(Keep::EMPTY.is_subset_of(&t));
        assert!(Keep::new(&[4]).unwrap().check_subset(&t).is_err());
    }

    #[test]
    fn keep_rejects_bad_input() {
        assert!(matches!(
            Keep::new(&[1, 1, 1, 1, 1, 1]),
            Err(DiceError::TooMany { got: 6, .. })
        ));
        assert_eq!(Keep::new(&[9]), Err(DiceError::FaceOutOfRange(9)));
    }

    #[test]
    fn throw_key_is_injective_on_sorted_throws() {
        let mut seen = std::collections::HashSet::new();
        for a in 1u8..=6 {
            for b in a..=6 {
                for c in b..=6 {
                    for d in c..=6 {
                        for e in d..=6 {
                            let t = Throw::new([a, b, c, d, e]).unwrap();
                            assert!(seen.insert(t.key()), "duplicate key for {}", t);
                        }
                    }
                }
            }
        }
        assert_eq!(seen.len(), 252);
    }
}
