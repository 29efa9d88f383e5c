//! Per-game scoresheet and its stable fingerprint.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::category::{Category, NUM_CATS};

/// Filled face total that earns the bonus.
pub const BONUS_THRESHOLD: u32 = 63;
/// Bonus value once the threshold is reached.
pub const BONUS_POINTS: u8 = 35;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("category {0} is already filled")]
    AlreadyFilled(Category),
    #[error("the bonus row is settled by the bonus rule, not filled directly")]
    BonusNotChoosable,
    #[error("{points} points is more than {cat} can hold")]
    PointsOutOfRange { cat: Category, points: u32 },
}

/// Scoresheet: one optional value per category, in canonical order.
///
/// A filled row is never reassigned. Bonus is filled exactly once by
/// [`Scoresheet::settle_bonus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scoresheet {
    rows: [Option<u8>; NUM_CATS],
}

impl Scoresheet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, cat: Category) -> Option<u8> {
        self.rows[cat.index()]
    }

    #[inline]
    pub fn is_filled(&self, cat: Category) -> bool {
        self.rows[cat.index()].is_some()
    }

    /// Write `points` into an open, choosable row.
    pub fn fill(&mut self, cat: Category, points: u32) -> Result<(), SheetError> {
        if !cat.is_choosable() {
            return Err(SheetError::BonusNotChoosable);
        }
        self.write(cat, points)
    }

    fn write(&mut self, cat: Category, points: u32) -> Result<(), SheetError> {
        if self.is_filled(cat) {
            return Err(SheetError::AlreadyFilled(cat));
        }
        if points > cat.max_points() {
            return Err(SheetError::PointsOutOfRange { cat, points });
        }
        self.rows[cat.index()] = Some(points as u8);
        Ok(())
    }

    /// Sum of the filled face rows.
    pub fn upper_total(&self) -> u32 {
        Category::FACES
            .iter()
            .filter_map(|&c| self.get(c))
            .map(u32::from)
            .sum()
    }

    pub fn faces_complete(&self) -> bool {
        Category::FACES.iter().all(|&c| self.is_filled(c))
    }

    /// Apply the bonus rule. Returns the bonus value if it was settled by this call.
    ///
    /// - filled face total >= 63 => Bonus = 35
    /// - all six faces filled below 63 => Bonus = 0
    /// - otherwise Bonus stays open
    pub fn settle_bonus(&mut self) -> Option<u8> {
        if self.is_filled(Category::Bonus) {
            return None;
        }
        let value = if self.upper_total() >= BONUS_THRESHOLD {
            BONUS_POINTS
        } else if self.faces_complete() {
            0
        } else {
            return None;
        };
        self.rows[Category::Bonus.index()] = Some(value);
        Some(value)
    }

    pub fn total(&self) -> u32 {
        self.rows.iter().flatten().map(|&v| v as u32).sum()
    }

    /// Open rows a player may still choose.
    pub fn open_rows(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL
            .into_iter()
            .filter(move |&c| c.is_choosable() && !self.is_filled(c))
    }

    /// All choosable rows filled. Bonus is settled by then.
    pub fn is_complete(&self) -> bool {
        self.open_rows().next().is_none()
    }

    pub fn key(&self) -> SheetKey {
        sheet_key(self)
    }
}

/// A compact, stable key for a [`Scoresheet`].
///
/// Independent of Rust's `Hash` randomness and of any insertion order: the
/// slots are always the canonical category order.
pub type SheetKey = u128;

/// Pack the sheet into 7 bits per category (1 filled bit + 6 value bits).
///
/// Every legal value is <= 50, so the packing is injective: two sheets share a
/// key iff they are equal. Total: 14 * 7 = 98 bits.
pub fn sheet_key(sheet: &Scoresheet) -> SheetKey {
    let mut x: u128 = 0;
    let mut shift: u32 = 0;
    for slot in &sheet.rows {
        if let Some(v) = *slot {
            debug_assert!(v < 64);
            x |= (0x40 | (v as u128 & 0x3F)) << shift;
        }
        shift += 7;
    }
    x
}

impl fmt::Display for Scoresheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in Category::ALL {
            match self.get(c) {
                Some(v) => writeln!(f, "{:12} -> {:2}", c.name(), v)?,
                None => writeln!(f, "{:12} ->", c.name())?,
            }
            if c == Category::Bonus {
                writeln!(f, "{}", "=".repeat(18))?;
            }
        }
        write!(f, "{:12} -> {}", "Total", self.total())
    }
}

impl Serialize for Scoresheet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<Category, Option<u8>> =
            Category::ALL.iter().map(|&c| (c, self.get(c))).collect();
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Scoresheet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<Category, Option<u32>>::deserialize(deserializer)?;
        let mut sheet = Scoresheet::new();
        for (cat, value) in map {
            if let Some(v) = value {
                sheet.write(cat, v).map_err(serde::de::Error::custom)?;
            }
        }
        Ok(sheet)
    }
}
