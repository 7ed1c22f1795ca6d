//! ai-987: engine + sampled-lookahead policy for 987, the Fibonacci variant of 2048
//!
//! This crate provides:
//! - An immutable `Board` with ergonomic methods (`shift`, `with_random_tile`, `is_game_over`, ...)
//! - A sampled lookahead search (`search` module) with single-threaded and parallel variants
//! - A `Game` driver that keeps board and score consistent (`game` module)
//! - A binary trace format for runs (`trace` module)
//!
//! Tiles merge when both are rank 1 or when their ranks differ by exactly one;
//! a rank shows as a Fibonacci number (`engine::tile_value`).
//!
//! Quick start:
//! ```
//! use ai_987::engine::{Board, Direction};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::empty(&mut rng).with_random_tile(&mut rng).with_random_tile(&mut rng);
//! if let Some((b1, gained)) = b0.shift(Direction::Left, &mut rng) {
//!     assert!(b1.count_occupied() <= b0.count_occupied());
//!     assert!(gained <= 4);
//! }
//! ```
//!
//! Full loop:
//! ```
//! use ai_987::engine::{new_board, Board};
//! use ai_987::search::best_move;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut board: Board = new_board(&mut rng);
//! let mut score = 0;
//! let mut moves = 0;
//! while !board.is_game_over() && moves < 4 {
//!     let (dir, _) = best_move(&board, 1, 2, &mut rng);
//!     let (moved, gained) = board.shift(dir, &mut rng).unwrap();
//!     board = moved.with_random_tile(&mut rng);
//!     score += gained;
//!     moves += 1;
//! }
//! assert_eq!(moves, 4);
//! ```
//!
pub mod engine;
pub mod game;
pub mod search;
pub mod trace;
