//! A single game: one board, one score, one randomness source.
//!
//! `Game` is the driver the engine expects: it serializes every move and
//! applies a move's board and score delta together, so callers never see a
//! board that disagrees with the score.
//!
//! ```
//! use ai_987::engine::Direction;
//! use ai_987::game::Game;
//! use ai_987::search::SampledSearch;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut game = Game::new(StdRng::seed_from_u64(123));
//! let mut policy = SampledSearch::new();
//! let mut moves = 0;
//! while !game.is_lost() && moves < 4 {
//!     if game.autoplay_step(&mut policy).is_none() {
//!         break;
//!     }
//!     moves += 1;
//! }
//! assert_eq!(game.moves(), moves);
//! ```

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use crate::engine::{Board, Direction, Score, DEFAULT_SIZE};
use crate::search::SampledSearch;

pub struct Game<R: Rng = StdRng> {
    size: usize,
    board: Board,
    score: Score,
    moves: u64,
    rng: R,
}

impl<R: Rng> Game<R> {
    /// New game on a default-size board with one spawned tile.
    pub fn new(rng: R) -> Self { Self::with_size(DEFAULT_SIZE, rng) }

    pub fn with_size(size: usize, mut rng: R) -> Self {
        let board = fresh_board(size, &mut rng);
        Game { size, board, score: 0, moves: 0, rng }
    }

    #[inline]
    pub fn board(&self) -> &Board { &self.board }

    #[inline]
    pub fn score(&self) -> Score { self.score }

    /// Number of moves that changed the board since the last reset.
    #[inline]
    pub fn moves(&self) -> u64 { self.moves }

    #[inline]
    pub fn is_lost(&self) -> bool { self.board.is_game_over() }

    /// Start over with a fresh board and zero score.
    pub fn reset(&mut self) {
        info!(score = self.score, moves = self.moves, "game reset");
        self.board = fresh_board(self.size, &mut self.rng);
        self.score = 0;
        self.moves = 0;
    }

    /// Apply `dir`, spawn a tile and add the score delta.
    ///
    /// Returns the points gained, or `None` (leaving the game untouched) if the
    /// move changes nothing.
    pub fn play(&mut self, dir: Direction) -> Option<Score> {
        let (moved, gained) = self.board.shift(dir, &mut self.rng)?;
        self.board = moved.with_random_tile(&mut self.rng);
        self.score += gained;
        self.moves += 1;
        debug!(%dir, gained, score = self.score, "move applied");
        if self.board.is_game_over() {
            info!(score = self.score, moves = self.moves, highest = self.board.highest_value(), "game over");
        }
        Some(gained)
    }

    /// Ask `policy` for a direction without applying it.
    pub fn suggest(&mut self, policy: &mut SampledSearch) -> (Direction, i64) {
        policy.best_move(&self.board, &mut self.rng)
    }

    /// Let `policy` pick and play one move. `None` once no move is left.
    pub fn autoplay_step(&mut self, policy: &mut SampledSearch) -> Option<Direction> {
        let dir = policy.get_next_move(&self.board, &mut self.rng)?;
        self.play(dir).map(|_| dir)
    }
}

fn fresh_board<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Board {
    Board::new(size, rng).with_random_tile(rng)
}
