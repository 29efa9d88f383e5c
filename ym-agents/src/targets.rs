//! Per-category reference scores for the target-relative scorer.
//!
//! Files are flat JSON objects mapping category names to numbers, e.g.
//! `{"1": 2.0, "2": 6.0, ..., "Yams": 0.0}`. Face rows use their digit as the key.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use thiserror::Error;
use ym_core::{Category, NUM_CATS};

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("failed to read target file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse target JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown category in target table: {0:?}")]
    UnknownCategory(String),
    #[error("target table has no entry for {0}")]
    Missing(Category),
    #[error("target for {0} is not a finite number")]
    NotFinite(Category),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetScores {
    label: String,
    values: [f64; NUM_CATS],
}

impl TargetScores {
    /// Load a target table; the label is the file stem minus its first `_`-separated
    /// segment (`target_median_YamsT1E.json` -> `median_YamsT1E`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TargetError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = match stem.split_once('_') {
            Some((_, rest)) => rest.to_string(),
            None => stem,
        };
        Self::from_json(label, &contents)
    }

    pub fn from_json(label: impl Into<String>, json: &str) -> Result<Self, TargetError> {
        let raw: HashMap<String, f64> = serde_json::from_str(json)?;
        let mut map = BTreeMap::new();
        for (key, value) in raw {
            let cat: Category = key
                .parse()
                .map_err(|_| TargetError::UnknownCategory(key.clone()))?;
            map.insert(cat, value);
        }
        Self::from_map(label, &map)
    }

    /// Every category, Bonus included, must be present.
    pub fn from_map(
        label: impl Into<String>,
        map: &BTreeMap<Category, f64>,
    ) -> Result<Self, TargetError> {
        let mut values = [0.0; NUM_CATS];
        for cat in Category::ALL {
            let v = *map.get(&cat).ok_or(TargetError::Missing(cat))?;
            if !v.is_finite() {
                return Err(TargetError::NotFinite(cat));
            }
            values[cat.index()] = v;
        }
        Ok(Self {
            label: label.into(),
            values,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn get(&self, cat: Category) -> f64 {
        self.values[cat.index()]
    }
}
