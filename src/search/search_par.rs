use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::engine::{Board, Direction, Score};

use super::{average, pick_best, sampled_value, BranchEval, SearchConfig, SearchStats};

/// Parallel sampled search using rayon.
///
/// Root moves are applied with the caller's generator, which then hands out one
/// seed per sample in `Up, Down, Left, Right` order. Samples run on the pool,
/// each with its own `StdRng`, so a seeded caller still gets a reproducible
/// answer. Values differ from [`super::SampledSearch`] for the same seed
/// because the random streams are split differently.
pub struct SampledSearchParallel {
    cfg: SearchConfig,
    stats: SearchStats,
}

struct RootJob {
    dir: Direction,
    moved: Option<(Board, Score)>,
    seeds: Vec<u64>,
}

impl SampledSearchParallel {
    pub fn new() -> Self { Self::with_config(SearchConfig::default()) }

    pub fn with_config(cfg: SearchConfig) -> Self { Self { cfg, stats: SearchStats::default() } }

    #[inline]
    pub fn config(&self) -> SearchConfig { self.cfg }

    #[inline]
    pub fn best_move<R: Rng + ?Sized>(&mut self, board: &Board, rng: &mut R) -> (Direction, i64) {
        pick_best(&self.branch_evals(board, rng))
    }

    /// Back-compat shim: the direction only, `None` once the game is over.
    #[inline]
    pub fn get_next_move<R: Rng + ?Sized>(&mut self, board: &Board, rng: &mut R) -> Option<Direction> {
        let (best, _) = self.best_move_with_branches(board, rng);
        best
    }

    /// Best move (if any) together with all branch evaluations.
    pub fn best_move_with_branches<R: Rng + ?Sized>(
        &mut self,
        board: &Board,
        rng: &mut R,
    ) -> (Option<Direction>, [BranchEval; 4]) {
        let branches = self.branch_evals(board, rng);
        let best = if branches.iter().any(|b| b.legal) { Some(pick_best(&branches).0) } else { None };
        (best, branches)
    }

    /// Value of each direction in `[Up, Down, Left, Right]` order, samples
    /// evaluated in parallel.
    pub fn branch_evals<R: Rng + ?Sized>(&mut self, board: &Board, rng: &mut R) -> [BranchEval; 4] {
        let SearchConfig { depth, breadth } = self.cfg;
        let samples = if depth == 0 { 0 } else { breadth };
        let jobs: Vec<RootJob> = Direction::ALL
            .iter()
            .map(|&dir| {
                let moved = board.shift(dir, rng);
                let seeds = match moved {
                    Some(_) => (0..samples).map(|_| rng.gen()).collect(),
                    None => Vec::new(),
                };
                RootJob { dir, moved, seeds }
            })
            .collect();

        let child_depth = depth.saturating_sub(1);
        let evaluated: Vec<(BranchEval, u64)> = jobs
            .into_par_iter()
            .map(|job| match job.moved {
                None => (BranchEval::illegal(job.dir), 0),
                Some((moved, gained)) => {
                    let results: Vec<(i64, u64)> = job
                        .seeds
                        .par_iter()
                        .map(|&seed| {
                            let mut rng = StdRng::seed_from_u64(seed);
                            let spawned = moved.with_random_tile(&mut rng);
                            let mut nodes = 0u64;
                            let (_, value) = sampled_value(&spawned, child_depth, breadth, &mut rng, &mut nodes);
                            (value, nodes)
                        })
                        .collect();
                    let nodes: u64 = results.iter().map(|&(_, n)| n).sum();
                    let extra = if results.is_empty() {
                        0
                    } else {
                        average(results.iter().map(|&(v, _)| v).sum(), breadth)
                    };
                    (BranchEval { dir: job.dir, value: gained as i64 + extra, legal: true }, nodes)
                }
            })
            .collect();

        let mut out = Direction::ALL.map(BranchEval::illegal);
        let mut nodes = 1u64;
        for (i, (branch, n)) in evaluated.into_iter().enumerate() {
            out[i] = branch;
            nodes += n;
        }
        self.stats.record(nodes);
        debug!(nodes, depth, breadth, "parallel sampled search finished");
        out
    }

    /// Statistics collected from the last search.
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }
}

impl Default for SampledSearchParallel {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SampledSearch, GAME_OVER_SCORE};

    fn early_board(seed: u64) -> Board {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut b = Board::empty(&mut rng);
        for _ in 0..5 {
            b = b.with_random_tile(&mut rng);
        }
        b
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let b = early_board(10);
        let mut search = SampledSearchParallel::with_config(SearchConfig { depth: 2, breadth: 4 });
        let first = search.branch_evals(&b, &mut StdRng::seed_from_u64(5));
        let second = search.branch_evals(&b, &mut StdRng::seed_from_u64(5));
        assert_eq!(first, second);
    }

    #[test]
    fn picks_a_legal_move() {
        let b = early_board(11);
        let mut search = SampledSearchParallel::new();
        let mut rng = StdRng::seed_from_u64(1);
        let (best, branches) = search.best_move_with_branches(&b, &mut rng);
        let best = best.unwrap();
        assert!(b.can_move(best));
        for branch in branches {
            assert_eq!(branch.legal, b.can_move(branch.dir));
        }
        assert!(search.last_stats().nodes > 1);
    }

    #[test]
    fn depth_zero_matches_sequential() {
        let b = early_board(12);
        let cfg = SearchConfig { depth: 0, breadth: 4 };
        let par = SampledSearchParallel::with_config(cfg).branch_evals(&b, &mut StdRng::seed_from_u64(3));
        let seq = SampledSearch::with_config(cfg).branch_evals(&b, &mut StdRng::seed_from_u64(3));
        assert_eq!(par, seq);
    }

    #[test]
    fn stuck_board_reports_sentinel() {
        let stuck = Board::from_ranks(2, &[1, 3, 3, 1]).unwrap();
        let mut search = SampledSearchParallel::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(search.best_move(&stuck, &mut rng), (Direction::Up, GAME_OVER_SCORE));
        assert_eq!(search.get_next_move(&stuck, &mut rng), None);
    }
}
