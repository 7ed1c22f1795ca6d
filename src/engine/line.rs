//! Per-line slide/merge, always toward index 0.

use rand::Rng;

use super::state::Cell;
use super::{random_key, EngineError, Rank, Score};

/// Collapse a line toward index 0.
///
/// Empty cells are dropped, then neighbours merge left to right: two rank-1
/// tiles become rank 2 (score 2), and ranks differing by exactly one become
/// `max + 1` (score is the sum of the two ranks). The merged tile keeps the
/// second cell's key, and a consumed cell is never looked at again. A pair
/// whose merged rank would not fit in [`Rank`] stays apart.
///
/// The returned sequence is dense (no empty cells) and never longer than `line`.
pub fn combine(line: &[Cell]) -> (Vec<Cell>, Score) {
    let values: Vec<Cell> = line.iter().copied().filter(|c| !c.is_empty()).collect();
    let mut out = Vec::with_capacity(values.len());
    let mut score: Score = 0;
    let mut i = 0;
    while i < values.len() {
        let current = values[i];
        let merged = values.get(i + 1).and_then(|&next| merged_rank(current.rank, next.rank).map(|r| (r, next)));
        match merged {
            Some((rank, next)) => {
                out.push(Cell::new(rank, next.key));
                // Rank sum, not displayed value sum. For 1 + 1 this is 2.
                score += Score::from(current.rank) + Score::from(next.rank);
                i += 2;
            }
            None => {
                out.push(current);
                i += 1;
            }
        }
    }
    (out, score)
}

/// Rank produced by merging two occupied tiles, `None` if they do not merge.
#[inline]
fn merged_rank(a: Rank, b: Rank) -> Option<Rank> {
    match (a, b) {
        (1, 1) => Some(2),
        _ if a.abs_diff(b) == 1 => a.max(b).checked_add(1),
        _ => None,
    }
}

/// Right-pad `values` with fresh empty cells up to `size`.
///
/// Fails if `values` is already longer than the board allows.
pub fn pad<R: Rng + ?Sized>(mut values: Vec<Cell>, size: usize, rng: &mut R) -> Result<Vec<Cell>, EngineError> {
    if values.len() > size {
        return Err(EngineError::LineOverflow { len: values.len(), size });
    }
    while values.len() < size {
        values.push(Cell::empty(random_key(rng)));
    }
    Ok(values)
}

/// Whether combining `line` would change its rank layout.
pub(crate) fn changes(line: &[Cell]) -> bool {
    let (combined, _) = combine(line);
    let moved = combined.iter().map(|c| c.rank).chain(std::iter::repeat(0));
    line.iter().map(|c| c.rank).zip(moved).any(|(before, after)| before != after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn cells(ranks: &[u8]) -> Vec<Cell> {
        ranks.iter().enumerate().map(|(i, &r)| Cell::new(r, 100 + i as u32)).collect()
    }

    fn ranks(cells: &[Cell]) -> Vec<u8> {
        cells.iter().map(|c| c.rank).collect()
    }

    #[test]
    fn double_one_merge() {
        let (out, score) = combine(&cells(&[1, 1, 0, 0]));
        assert_eq!(out, vec![Cell::new(2, 101)]);
        assert_eq!(score, 2);
    }

    #[test]
    fn adjacent_rank_merge_scores_rank_sum() {
        // 3 and 4 show as 3 and 5; the score is still 3 + 4.
        let (out, score) = combine(&cells(&[3, 4, 0, 0]));
        assert_eq!(out, vec![Cell::new(5, 101)]);
        assert_eq!(score, 7);
    }

    #[test]
    fn no_spurious_merge() {
        let (out, score) = combine(&cells(&[3, 6, 0, 0]));
        assert_eq!(out, vec![Cell::new(3, 100), Cell::new(6, 101)]);
        assert_eq!(score, 0);
        assert!(!changes(&cells(&[3, 6, 0, 0])));
    }

    #[test]
    fn equal_ranks_above_one_do_not_merge() {
        let (out, score) = combine(&cells(&[2, 2, 3, 3]));
        // 2,2 stays; then 2,3 merge into 4; the last 3 is alone.
        assert_eq!(ranks(&out), vec![2, 4, 3]);
        assert_eq!(score, 5);
    }

    #[test]
    fn gaps_are_collapsed_before_merging() {
        let (out, score) = combine(&cells(&[1, 0, 0, 1]));
        assert_eq!(out, vec![Cell::new(2, 103)]);
        assert_eq!(score, 2);
    }

    #[test]
    fn consumed_cells_are_not_reused() {
        // 1,1 -> 2, then the remaining 1,2 -> 3.
        let (out, score) = combine(&cells(&[1, 1, 1, 2]));
        assert_eq!(ranks(&out), vec![2, 3]);
        assert_eq!(score, 2 + 3);
        // Chains are resolved pairwise, never cascaded.
        let (out, _) = combine(&cells(&[2, 3, 4, 0]));
        assert_eq!(ranks(&out), vec![4, 4]);
    }

    #[test]
    fn top_ranks_stay_apart() {
        // 255 has no successor in a u8 rank.
        let (out, score) = combine(&cells(&[254, 255, 0, 0]));
        assert_eq!(out, vec![Cell::new(254, 100), Cell::new(255, 101)]);
        assert_eq!(score, 0);
        assert!(!changes(&cells(&[254, 255, 0, 0])));
        // One step lower still merges.
        let (out, score) = combine(&cells(&[253, 254]));
        assert_eq!(out, vec![Cell::new(255, 101)]);
        assert_eq!(score, 507);
    }

    #[test]
    fn pad_fills_with_empties() {
        let mut rng = StdRng::seed_from_u64(1);
        let padded = pad(cells(&[5]), 4, &mut rng).unwrap();
        assert_eq!(ranks(&padded), vec![5, 0, 0, 0]);
        assert_eq!(padded[0].key, 100);
    }

    #[test]
    fn pad_rejects_overflow() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = pad(cells(&[1, 2, 3, 4, 5]), 4, &mut rng).unwrap_err();
        assert_eq!(err, EngineError::LineOverflow { len: 5, size: 4 });
    }

    #[test]
    fn changes_detects_slides_and_merges() {
        assert!(changes(&cells(&[0, 0, 0, 7])));
        assert!(changes(&cells(&[2, 1, 0, 0])));
        assert!(!changes(&cells(&[0, 0, 0, 0])));
        assert!(!changes(&cells(&[1, 3, 1, 3])));
    }
}
