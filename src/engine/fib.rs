//! Displayed magnitudes for tile ranks.
//!
//! Rank `r` shows entry `r` of the zero-indexed sequence `1, 1, 2, 3, 5, ...`,
//! so two rank-1 tiles (1 + 1) make a rank-2 tile (2) and ranks `r` and `r + 1`
//! make rank `r + 2`.

use super::Rank;

/// Number of precomputed entries. Entry 63 still fits a `u64`.
pub const VALUE_TABLE_LEN: usize = 64;

/// Precomputed magnitudes, indexed by rank. Entry 0 is never displayed.
pub static VALUE_TABLE: [u64; VALUE_TABLE_LEN] = build_table();

const fn build_table() -> [u64; VALUE_TABLE_LEN] {
    let mut table = [1u64; VALUE_TABLE_LEN];
    let mut i = 2;
    while i < VALUE_TABLE_LEN {
        table[i] = table[i - 1] + table[i - 2];
        i += 1;
    }
    table
}

/// First `n` entries of the value sequence.
///
/// ```
/// use ai_987::engine::fibonacci;
/// assert_eq!(fibonacci(6), vec![1, 1, 2, 3, 5, 8]);
/// ```
pub fn fibonacci(n: usize) -> Vec<u64> {
    let (mut a, mut b) = (1u64, 1u64);
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(a);
        (a, b) = (b, a.saturating_add(b));
    }
    out
}

/// Displayed magnitude for `rank`, or `None` for empty cells and ranks past the table.
///
/// ```
/// use ai_987::engine::tile_value;
/// assert_eq!(tile_value(0), None);
/// assert_eq!(tile_value(1), Some(1));
/// assert_eq!(tile_value(4), Some(5));
/// ```
#[inline]
pub fn tile_value(rank: Rank) -> Option<u64> {
    match rank {
        0 => None,
        r => VALUE_TABLE.get(r as usize).copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_generator() {
        assert_eq!(fibonacci(VALUE_TABLE_LEN), VALUE_TABLE.to_vec());
    }

    #[test]
    fn small_ranks() {
        let shown: Vec<_> = (1..=8).map(|r| tile_value(r).unwrap()).collect();
        assert_eq!(shown, vec![1, 2, 3, 5, 8, 13, 21, 34]);
    }

    #[test]
    fn merges_follow_the_sum_identity() {
        // double-one merge
        assert_eq!(tile_value(1).unwrap() * 2, tile_value(2).unwrap());
        // adjacent-rank merge
        for r in 1..40u8 {
            assert_eq!(
                tile_value(r).unwrap() + tile_value(r + 1).unwrap(),
                tile_value(r + 2).unwrap()
            );
        }
    }

    #[test]
    fn out_of_range() {
        assert_eq!(tile_value(VALUE_TABLE_LEN as Rank), None);
        assert_eq!(tile_value(u8::MAX), None);
        assert!(fibonacci(0).is_empty());
    }
}
