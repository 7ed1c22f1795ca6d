use rand::Rng;
use tracing::debug;

use crate::engine::{Board, Direction};

use super::{pick_best, sample_continuations, BranchEval, SearchConfig, SearchStats};

/// Single-threaded sampled search.
pub struct SampledSearch {
    cfg: SearchConfig,
    stats: SearchStats,
}

impl SampledSearch {
    pub fn new() -> Self { Self::with_config(SearchConfig::default()) }

    pub fn with_config(cfg: SearchConfig) -> Self { Self { cfg, stats: SearchStats::default() } }

    #[inline]
    pub fn config(&self) -> SearchConfig { self.cfg }

    /// Best direction and its estimated value.
    ///
    /// Consumes `rng` exactly like [`super::best_move`] with the same depth and
    /// breadth, so both agree for equal seeds.
    #[inline]
    pub fn best_move<R: Rng + ?Sized>(&mut self, board: &Board, rng: &mut R) -> (Direction, i64) {
        pick_best(&self.branch_evals(board, rng))
    }

    /// Back-compat shim: the direction only, `None` once the game is over.
    #[inline]
    pub fn get_next_move<R: Rng + ?Sized>(&mut self, board: &Board, rng: &mut R) -> Option<Direction> {
        let branches = self.branch_evals(board, rng);
        if branches.iter().any(|b| b.legal) { Some(pick_best(&branches).0) } else { None }
    }

    /// Value of each direction in `[Up, Down, Left, Right]` order; no-op moves
    /// are marked `legal = false`.
    pub fn branch_evals<R: Rng + ?Sized>(&mut self, board: &Board, rng: &mut R) -> [BranchEval; 4] {
        let SearchConfig { depth, breadth } = self.cfg;
        let mut nodes = 1u64;
        let out = Direction::ALL.map(|dir| match board.shift(dir, rng) {
            Some((moved, gained)) => {
                let extra = sample_continuations(&moved, depth, breadth, rng, &mut nodes);
                BranchEval { dir, value: gained as i64 + extra, legal: true }
            }
            None => BranchEval::illegal(dir),
        });
        self.stats.record(nodes);
        debug!(nodes, depth, breadth, "sampled search finished");
        out
    }

    /// Statistics collected from the last search.
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }
}

impl Default for SampledSearch {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{best_move, GAME_OVER_SCORE};
    use rand::{rngs::StdRng, SeedableRng};

    fn midgame(seed: u64) -> Board {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut b = Board::empty(&mut rng).with_random_tile(&mut rng);
        for i in 0..10 {
            if let Some((next, _)) = b.shift(Direction::ALL[i % 4], &mut rng) {
                b = next.with_random_tile(&mut rng);
            }
        }
        b
    }

    #[test]
    fn agrees_with_free_function() {
        let b = midgame(3);
        let cfg = SearchConfig { depth: 2, breadth: 3 };
        let mut search = SampledSearch::with_config(cfg);
        let from_struct = search.best_move(&b, &mut StdRng::seed_from_u64(8));
        let from_fn = best_move(&b, cfg.depth, cfg.breadth, &mut StdRng::seed_from_u64(8));
        assert_eq!(from_struct, from_fn);
    }

    #[test]
    fn branch_evals_mark_illegal_moves() {
        let b = Board::from_ranks(4, &[3, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        let mut search = SampledSearch::with_config(SearchConfig { depth: 0, breadth: 4 });
        let branches = search.branch_evals(&b, &mut StdRng::seed_from_u64(0));
        let legal: Vec<_> = branches.iter().map(|b| b.legal).collect();
        assert_eq!(legal, vec![false, true, true, true]);
        assert_eq!(branches[2].value, 7);
        assert_eq!(search.last_stats().nodes, 1);
    }

    #[test]
    fn stats_track_peak() {
        let b = midgame(4);
        let mut search = SampledSearch::with_config(SearchConfig { depth: 1, breadth: 2 });
        let mut rng = StdRng::seed_from_u64(1);
        search.best_move(&b, &mut rng);
        let first = search.last_stats();
        assert!(first.nodes > 1);
        assert_eq!(first.peak_nodes, first.nodes);
        search.reset_stats();
        assert_eq!(search.last_stats(), SearchStats::default());
    }

    #[test]
    fn next_move_is_none_when_stuck() {
        let stuck = Board::from_ranks(2, &[1, 3, 3, 1]).unwrap();
        let mut search = SampledSearch::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(search.get_next_move(&stuck, &mut rng), None);
        assert_eq!(search.best_move(&stuck, &mut rng), (Direction::Up, GAME_OVER_SCORE));
    }
}
