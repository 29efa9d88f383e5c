//! Shared inputs for the criterion benches.

use ym_core::{Category, Scoresheet, SheetError, Throw};

/// Deterministic sorted throws from a xorshift64 stream.
pub fn gen_throw_samples(n: usize) -> Vec<Throw> {
    let mut x: u64 = 0x1234_5678_9ABC_DEF0;
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let mut d = [0u8; 5];
        for slot in d.iter_mut() {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            *slot = (x % 6) as u8 + 1;
        }
        out.push(Throw::from_parts(&d, &[]));
    }
    out
}

/// A sheet with the first `filled` rows of the elimination order written at 0,
/// so search cost can be measured from opening to endgame.
pub fn sheet_with_filled(filled: usize) -> Result<Scoresheet, SheetError> {
    let mut s = Scoresheet::new();
    for cat in ym_core::ELIMINATION_ORDER.into_iter().take(filled) {
        s.fill(cat, 0)?;
    }
    s.settle_bonus();
    Ok(s)
}

pub fn open_rows(sheet: &Scoresheet) -> Vec<Category> {
    sheet.open_rows().collect()
}
