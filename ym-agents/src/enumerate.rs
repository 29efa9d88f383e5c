//! Exhaustive enumeration of keep choices and re-throw outcomes.

use ym_core::{Keep, Throw, NUM_DICE};

/// All distinct sorted throws reachable by rolling the dice not in `kept`.
///
/// The 6^k raw draws collapse onto the distinct multisets of k dice, so the
/// outcomes are generated directly as non-decreasing sequences instead of
/// enumerating every ordered draw and deduplicating. The result is the same
/// set, returned in ascending order.
///
/// Each outcome appears once, unweighted: folding these with a mean treats
/// every distinct outcome as equally likely, which is not the true dice
/// distribution (e.g. (1,2) is twice as likely as (1,1) on two dice).
pub fn generate_all_throws(kept: &Keep) -> Vec<Throw> {
    let k = kept.to_roll();
    let mut out = Vec::with_capacity(num_multisets(k));
    let mut rolled = [1u8; NUM_DICE];
    push_multisets(kept.as_slice(), &mut rolled, k, 0, 1, &mut out);
    out.sort_unstable();
    out
}

fn push_multisets(
    kept: &[u8],
    rolled: &mut [u8; NUM_DICE],
    k: usize,
    pos: usize,
    min_face: u8,
    out: &mut Vec<Throw>,
) {
    if pos == k {
        out.push(Throw::from_parts(kept, &rolled[..k]));
        return;
    }
    for face in min_face..=6 {
        rolled[pos] = face;
        push_multisets(kept, rolled, k, pos + 1, face, out);
    }
}

/// Number of distinct multisets of `k` dice: C(k + 5, 5).
pub fn num_multisets(k: usize) -> usize {
    [1, 6, 21, 56, 126, 252][k.min(NUM_DICE)]
}

/// Every distinct keep-subset of `throw`, including the empty keep and the whole throw.
///
/// Index subsets are visited in mask order (0..32) and the first occurrence of each
/// value-subset is kept, so the order is deterministic: duplicates such as keeping
/// either of two 2s collapse onto the earlier mask.
pub fn powerset(throw: &Throw) -> Vec<Keep> {
    let mut out: Vec<Keep> = Vec::with_capacity(32);
    for mask in 0u8..(1 << NUM_DICE) {
        let keep = throw.keep_mask(mask);
        if !out.contains(&keep) {
            out.push(keep);
        }
    }
    out
}
