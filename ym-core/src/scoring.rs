//! Score rules: achievable points per category for a throw against a sheet.

use crate::category::{Category, NUM_CATS};
use crate::dice::Throw;
use crate::sheet::{Scoresheet, BONUS_POINTS, BONUS_THRESHOLD};

/// Points per category, indexed by [`Category::index`].
pub type SheetPoints = [u32; NUM_CATS];

const PETITE_SUITES: [[u8; 4]; 3] = [[1, 2, 3, 4], [2, 3, 4, 5], [3, 4, 5, 6]];
const GRANDE_SUITES: [[u8; 5]; 2] = [[1, 2, 3, 4, 5], [2, 3, 4, 5, 6]];

/// Raw category scores for a throw, ignoring the sheet. Bonus is always 0.
pub fn scores_for_throw(throw: Throw) -> SheetPoints {
    let counts = throw.counts();
    let mut s = [0u32; NUM_CATS];

    for cat in Category::FACES {
        if let Some(face) = cat.face() {
            s[cat.index()] = face as u32 * counts[(face - 1) as usize] as u32;
        }
    }

    s[Category::Chance.index()] = throw.sum();

    // Most common face; the highest wins a tie, which only matters below 3.
    let (top_face, top_count) = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| (i as u32 + 1, c))
        .max_by_key(|&(f, c)| (c, f))
        .unwrap_or((1, 0));
    let distinct = counts.iter().filter(|&&c| c > 0).count();

    if distinct == 2 && top_count == 3 {
        s[Category::Full.index()] = 25;
    }
    if top_count >= 3 {
        s[Category::Brelan.index()] = 3 * top_face;
    }
    if top_count >= 4 {
        s[Category::Carre.index()] = 4 * top_face;
    }
    if PETITE_SUITES
        .iter()
        .any(|run| run.iter().all(|&f| counts[(f - 1) as usize] > 0))
    {
        s[Category::PetiteSuite.index()] = 30;
    }
    if GRANDE_SUITES
        .iter()
        .any(|run| run.iter().all(|&f| counts[(f - 1) as usize] > 0))
    {
        s[Category::GrandeSuite.index()] = 40;
    }
    if top_count == 5 {
        s[Category::Yams.index()] = 50;
    }

    s
}

/// Achievable points for every category, as seen when choosing a row.
///
/// - Filled rows (and Bonus) score 0.
/// - While Bonus is open, a face row that lifts the filled face total to 63 or
///   more is credited with the +35 bonus it would unlock.
pub fn sheet_points(sheet: &Scoresheet, throw: Throw) -> SheetPoints {
    let mut s = scores_for_throw(throw);
    let project_bonus = !sheet.is_filled(Category::Bonus);
    let upper = sheet.upper_total();

    for cat in Category::ALL {
        let i = cat.index();
        if !cat.is_choosable() || sheet.is_filled(cat) {
            s[i] = 0;
            continue;
        }
        if project_bonus && cat.is_face() && upper + s[i] >= BONUS_THRESHOLD {
            s[i] += BONUS_POINTS as u32;
        }
    }
    s
}

/// The value actually written on the sheet when `cat` is chosen for `throw`.
///
/// No bonus projection: the bonus row is settled separately by the round driver.
pub fn realized_points(sheet: &Scoresheet, throw: Throw, cat: Category) -> u32 {
    if !cat.is_choosable() || sheet.is_filled(cat) {
        return 0;
    }
    scores_for_throw(throw)[cat.index()]
}
