//! Scoresheet categories and their fixed orders.
//!
//! Category order matches the paper scoresheet: the six face rows, the bonus,
//! then the combinations from Chance up to Yams.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const NUM_CATS: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Bonus,
    Chance,
    Brelan,
    Carre,
    Full,
    PetiteSuite,
    GrandeSuite,
    Yams,
}

/// Rows sacrificed (scored 0) when the preferred row is no longer open.
///
/// Chance closes the list so that a sheet with only Chance left open still
/// resolves to a row.
pub const ELIMINATION_ORDER: [Category; 13] = [
    Category::Yams,
    Category::One,
    Category::GrandeSuite,
    Category::PetiteSuite,
    Category::Full,
    Category::Two,
    Category::Carre,
    Category::Brelan,
    Category::Three,
    Category::Four,
    Category::Five,
    Category::Six,
    Category::Chance,
];

impl Category {
    /// All categories in canonical sheet order.
    pub const ALL: [Category; NUM_CATS] = [
        Category::One,
        Category::Two,
        Category::Three,
        Category::Four,
        Category::Five,
        Category::Six,
        Category::Bonus,
        Category::Chance,
        Category::Brelan,
        Category::Carre,
        Category::Full,
        Category::PetiteSuite,
        Category::GrandeSuite,
        Category::Yams,
    ];

    /// The six face rows, in order.
    pub const FACES: [Category; 6] = [
        Category::One,
        Category::Two,
        Category::Three,
        Category::Four,
        Category::Five,
        Category::Six,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// # Panics
    /// Panics if `idx >= NUM_CATS`.
    pub fn from_index(idx: usize) -> Category {
        assert!(idx < NUM_CATS, "category index out of range: {}", idx);
        Self::ALL[idx]
    }

    /// Face value (1..=6) for the upper rows, `None` otherwise.
    pub fn face(self) -> Option<u8> {
        match self {
            Category::One => Some(1),
            Category::Two => Some(2),
            Category::Three => Some(3),
            Category::Four => Some(4),
            Category::Five => Some(5),
            Category::Six => Some(6),
            _ => None,
        }
    }

    pub fn from_face(face: u8) -> Option<Category> {
        match face {
            1..=6 => Some(Self::FACES[(face - 1) as usize]),
            _ => None,
        }
    }

    pub fn is_face(self) -> bool {
        self.face().is_some()
    }

    /// Bonus is settled by the round driver and never picked by a player.
    pub fn is_choosable(self) -> bool {
        self != Category::Bonus
    }

    /// Largest value this row can ever hold on a sheet.
    pub fn max_points(self) -> u32 {
        match self {
            Category::One => 5,
            Category::Two => 10,
            Category::Three => 15,
            Category::Four => 20,
            Category::Five => 25,
            Category::Six => 30,
            Category::Bonus => 35,
            Category::Chance => 30,
            Category::Brelan => 18,
            Category::Carre => 24,
            Category::Full => 25,
            Category::PetiteSuite => 30,
            Category::GrandeSuite => 40,
            Category::Yams => 50,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::One => "1",
            Category::Two => "2",
            Category::Three => "3",
            Category::Four => "4",
            Category::Five => "5",
            Category::Six => "6",
            Category::Bonus => "Bonus",
            Category::Chance => "Chance",
            Category::Brelan => "Brelan",
            Category::Carre => "Carré",
            Category::Full => "Full",
            Category::PetiteSuite => "Petite Suite",
            Category::GrandeSuite => "Grande Suite",
            Category::Yams => "Yams",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Some(c) = Self::ALL.iter().find(|c| c.name() == t) {
            return Ok(*c);
        }
        match t {
            "Carre" => Ok(Category::Carre),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
