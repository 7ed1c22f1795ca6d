//! Sampled lookahead search ("best move") for 987.
//!
//! The value of a move is its immediate score plus, while depth remains, the
//! floor average of `breadth` sampled continuations: each sample spawns a
//! random tile on the moved board and recurses one ply shallower. Spawn
//! randomness is sampled rather than enumerated, so the estimate is noisy by
//! design and cheap at shallow depth (`O(4 * breadth^depth)` boards).
//!
//! Two policies share this recursion:
//! - [`SampledSearch`]: single-threaded.
//! - [`SampledSearchParallel`]: rayon over root directions and samples, each
//!   sample with its own seeded generator.
//!
//! Both are deterministic for a seeded `rng`.
//!
//! ```
//! use ai_987::engine::{new_board, Direction};
//! use ai_987::search::{best_move, SampledSearch};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let b = new_board(&mut rng).with_random_tile(&mut rng);
//! let (dir, value) = best_move(&b, 2, 3, &mut rng);
//! assert!(b.can_move(dir) && value >= 0);
//!
//! let mut search = SampledSearch::new();
//! let (dir, _) = search.best_move(&b, &mut rng);
//! assert!(Direction::ALL.contains(&dir));
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{Board, Direction};

mod search_par;
mod search_seq;

pub use search_par::SampledSearchParallel;
pub use search_seq::SampledSearch;

/// Value reported for a board with no legal move. Lower than any real estimate.
pub const GAME_OVER_SCORE: i64 = -123_456_789;

/// Search knobs. Defaults are the auto-play settings (depth 3, breadth 4).
///
/// - `depth`: plies of lookahead after the root move.
/// - `breadth`: sampled spawns averaged per move; 0 disables lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub depth: u32,
    pub breadth: u32,
}

impl Default for SearchConfig {
    fn default() -> Self { Self { depth: 3, breadth: 4 } }
}

/// Estimated value of one root direction.
///
/// `legal` is false when the move is a no-op for the board; `value` is then 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchEval {
    pub dir: Direction,
    pub value: i64,
    pub legal: bool,
}

impl BranchEval {
    #[inline]
    fn illegal(dir: Direction) -> Self { BranchEval { dir, value: 0, legal: false } }
}

/// Basic search stats for a single evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub peak_nodes: u64,
}

impl SearchStats {
    fn record(&mut self, nodes: u64) {
        self.nodes = nodes;
        self.peak_nodes = self.peak_nodes.max(nodes);
    }
}

/// Recommend a direction for `board` with `depth` plies of lookahead and
/// `breadth` sampled spawns per move.
///
/// On a game-over board returns `(Direction::Up, GAME_OVER_SCORE)`. Ties keep
/// the first direction in `Up, Down, Left, Right` order.
pub fn best_move<R: Rng + ?Sized>(board: &Board, depth: u32, breadth: u32, rng: &mut R) -> (Direction, i64) {
    let mut nodes = 0;
    sampled_value(board, depth, breadth, rng, &mut nodes)
}

pub(crate) fn sampled_value<R: Rng + ?Sized>(
    board: &Board,
    depth: u32,
    breadth: u32,
    rng: &mut R,
    nodes: &mut u64,
) -> (Direction, i64) {
    *nodes += 1;
    if board.is_game_over() {
        return (Direction::Up, GAME_OVER_SCORE);
    }
    let mut best: Option<(Direction, i64)> = None;
    for dir in Direction::ALL {
        let Some((moved, gained)) = board.shift(dir, rng) else { continue };
        let value = gained as i64 + sample_continuations(&moved, depth, breadth, rng, nodes);
        if best.map_or(true, |(_, v)| value > v) {
            best = Some((dir, value));
        }
    }
    best.unwrap_or((Direction::Up, GAME_OVER_SCORE))
}

/// Floor average over `breadth` independent spawn-then-search samples of `moved`.
pub(crate) fn sample_continuations<R: Rng + ?Sized>(
    moved: &Board,
    depth: u32,
    breadth: u32,
    rng: &mut R,
    nodes: &mut u64,
) -> i64 {
    if depth == 0 || breadth == 0 {
        return 0;
    }
    let mut total = 0i64;
    for _ in 0..breadth {
        let spawned = moved.with_random_tile(rng);
        total += sampled_value(&spawned, depth - 1, breadth, rng, nodes).1;
    }
    average(total, breadth)
}

#[inline]
pub(crate) fn average(total: i64, samples: u32) -> i64 { total.div_euclid(i64::from(samples.max(1))) }

/// Strictly greatest legal branch, first wins ties; sentinel if none is legal.
pub(crate) fn pick_best(branches: &[BranchEval; 4]) -> (Direction, i64) {
    branches
        .iter()
        .filter(|branch| branch.legal)
        .fold(None, |best: Option<(Direction, i64)>, branch| match best {
            Some((_, v)) if branch.value <= v => best,
            _ => Some((branch.dir, branch.value)),
        })
        .unwrap_or((Direction::Up, GAME_OVER_SCORE))
}
