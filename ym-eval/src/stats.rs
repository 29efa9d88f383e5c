//! Score statistics over finished games.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use ym_agents::median;
use ym_core::{Category, Scoresheet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub n: u64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1).
    pub std: f64,
    /// 95% confidence half-width of the mean.
    pub ci95: f64,
    pub min: u32,
    pub max: u32,
}

pub fn summarize_scores(scores: &[u32]) -> ScoreSummary {
    let n = scores.len() as u64;
    if n == 0 {
        return ScoreSummary::default();
    }

    let n_f = n as f64;
    let sum: f64 = scores.iter().map(|&s| s as f64).sum();
    let sumsq: f64 = scores.iter().map(|&s| (s as f64) * (s as f64)).sum();
    let mean = sum / n_f;
    // Sample variance from moments: var = (Σx² - (Σx)²/n)/(n-1)
    let var = if n > 1 {
        ((sumsq - sum * sum / n_f) / (n_f - 1.0)).max(0.0)
    } else {
        0.0
    };
    let std = var.sqrt();
    let as_f: Vec<f64> = scores.iter().map(|&s| s as f64).collect();

    ScoreSummary {
        n,
        mean,
        median: median(&as_f),
        std,
        ci95: 1.96 * std / n_f.sqrt(),
        min: scores.iter().copied().min().unwrap_or(0),
        max: scores.iter().copied().max().unwrap_or(0),
    }
}

/// Text histogram with `bucket`-wide bins, one line per non-empty bin:
/// `180-189 |##### 12`. Bars are scaled so the tallest has `width` marks.
pub fn histogram(scores: &[u32], bucket: u32, width: usize) -> String {
    let bucket = bucket.max(1);
    let mut bins: BTreeMap<u32, usize> = BTreeMap::new();
    for &s in scores {
        *bins.entry(s / bucket).or_default() += 1;
    }
    let tallest = bins.values().copied().max().unwrap_or(0);

    let mut out = String::new();
    for (bin, count) in bins {
        let lo = bin * bucket;
        let bar = if tallest == 0 {
            0
        } else {
            (count * width).div_ceil(tallest)
        };
        let _ = writeln!(
            out,
            "{:>4}-{:<4} |{} {}",
            lo,
            lo + bucket - 1,
            "#".repeat(bar),
            count
        );
    }
    out
}

/// Median final value of every row; unfilled rows count as 0.
///
/// The result is the reference table consumed by the target-relative scorer.
pub fn category_medians(sheets: &[Scoresheet]) -> BTreeMap<Category, f64> {
    Category::ALL
        .into_iter()
        .map(|cat| {
            let values: Vec<f64> = sheets
                .iter()
                .map(|s| s.get(cat).unwrap_or(0) as f64)
                .collect();
            (cat, median(&values))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_known_scores() {
        let s = summarize_scores(&[100, 200, 300, 400]);
        assert_eq!(s.n, 4);
        assert_eq!(s.mean, 250.0);
        assert_eq!(s.median, 250.0);
        assert_eq!((s.min, s.max), (100, 400));
        // Sample variance = 50000 / 3.
        assert!((s.std - (50000.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((s.ci95 - 1.96 * s.std / 2.0).abs() < 1e-9);
    }

    #[test]
    fn summary_edge_cases() {
        assert_eq!(summarize_scores(&[]), ScoreSummary::default());
        let one = summarize_scores(&[187]);
        assert_eq!(one.std, 0.0);
        assert_eq!(one.median, 187.0);
    }

    #[test]
    fn histogram_bins_by_ten() {
        let h = histogram(&[181, 185, 189, 203, 250, 251], 10, 10);
        let lines: Vec<&str> = h.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(" 180-189"));
        assert!(lines[0].ends_with("########## 3"));
        assert!(lines[1].contains("200-209"));
        assert!(lines[2].ends_with(" 2"));
        assert_eq!(histogram(&[], 10, 10), "");
    }

    #[test]
    fn medians_per_row() {
        let mut a = Scoresheet::new();
        a.fill(Category::Yams, 50).unwrap();
        a.fill(Category::Chance, 20).unwrap();
        let mut b = Scoresheet::new();
        b.fill(Category::Yams, 0).unwrap();
        b.fill(Category::Chance, 24).unwrap();
        let mut c = Scoresheet::new();
        c.fill(Category::Yams, 50).unwrap();

        let m = category_medians(&[a, b, c]);
        assert_eq!(m.len(), 14);
        assert_eq!(m[&Category::Yams], 50.0);
        assert_eq!(m[&Category::Chance], 20.0);
        assert_eq!(m[&Category::Bonus], 0.0);
    }
}
