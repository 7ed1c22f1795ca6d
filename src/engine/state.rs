use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::line;
use super::{random_key, tile_value, Direction, EngineError, Rank, Score, TileKey, DEFAULT_SIZE};

/// One grid cell: a rank (0 = empty) and an identity key.
///
/// The key has no effect on game logic. Empty cells carry one too; it is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub rank: Rank,
    pub key: TileKey,
}

impl Cell {
    #[inline]
    pub const fn new(rank: Rank, key: TileKey) -> Self { Cell { rank, key } }

    #[inline]
    pub const fn empty(key: TileKey) -> Self { Cell { rank: 0, key } }

    #[inline]
    pub const fn is_empty(&self) -> bool { self.rank == 0 }

    /// Displayed magnitude, `None` when empty.
    #[inline]
    pub fn value(&self) -> Option<u64> { tile_value(self.rank) }
}

/// Immutable N×N grid of cells, row-major.
///
/// Every transform returns a new `Board`; nothing mutates in place. Equality
/// compares keys as well as ranks, use [`Board::same_ranks`] to ignore keys.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Empty `size`×`size` board with fresh keys.
    pub fn new<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let cells = (0..size * size).map(|_| Cell::empty(random_key(rng))).collect();
        Board { size, cells }
    }

    /// Empty board of [`DEFAULT_SIZE`].
    ///
    /// ```
    /// use ai_987::engine::Board;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(3);
    /// let b = Board::empty(&mut rng);
    /// assert_eq!(b.count_empty(), 16);
    /// assert!(b.is_game_over());
    /// ```
    pub fn empty<R: Rng + ?Sized>(rng: &mut R) -> Self { Board::new(DEFAULT_SIZE, rng) }

    /// Build from row-major cells; `cells.len()` must be `size * size`.
    pub fn from_cells(size: usize, cells: Vec<Cell>) -> Result<Self, EngineError> {
        if cells.len() != size * size {
            return Err(EngineError::CellCount { expected: size * size, actual: cells.len() });
        }
        Ok(Board { size, cells })
    }

    /// Build from rows; the row count sets the size and every row must match it.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, EngineError> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() > size {
                return Err(EngineError::LineOverflow { len: values.len(), size });
            }
            if values.len() != size {
                return Err(EngineError::RaggedRow { row, len: values.len(), size });
            }
            cells.extend(values);
        }
        Ok(Board { size, cells })
    }

    /// Build from row-major ranks. Keys are the 1-based cell positions, which
    /// keeps boards rebuilt from traces and fixtures deterministic.
    ///
    /// ```
    /// use ai_987::engine::{Board, Direction};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let b = Board::from_ranks(2, &[1, 1, 0, 0]).unwrap();
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let (moved, score) = b.shift(Direction::Left, &mut rng).unwrap();
    /// assert_eq!(moved.ranks().collect::<Vec<_>>(), vec![2, 0, 0, 0]);
    /// assert_eq!(score, 2);
    /// ```
    pub fn from_ranks(size: usize, ranks: &[Rank]) -> Result<Self, EngineError> {
        let cells = ranks
            .iter()
            .enumerate()
            .map(|(i, &rank)| Cell::new(rank, i as TileKey + 1))
            .collect();
        Board::from_cells(size, cells)
    }

    #[inline]
    pub fn size(&self) -> usize { self.size }

    #[inline]
    pub fn cells(&self) -> &[Cell] { &self.cells }

    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.size && col < self.size { Some(self.cells[row * self.size + col]) } else { None }
    }

    /// Row `i`. Panics if out of range.
    #[inline]
    pub fn row(&self, i: usize) -> &[Cell] { &self.cells[i * self.size..(i + 1) * self.size] }

    /// Column `i`, top to bottom. Panics if out of range.
    pub fn column(&self, i: usize) -> Vec<Cell> {
        assert!(i < self.size, "column {i} out of range for size {}", self.size);
        (0..self.size).map(|j| self.cells[j * self.size + i]).collect()
    }

    /// Ranks in row-major order.
    pub fn ranks(&self) -> impl Iterator<Item = Rank> + '_ { self.cells.iter().map(|c| c.rank) }

    /// True if both boards have the same rank layout, ignoring keys.
    pub fn same_ranks(&self, other: &Board) -> bool {
        self.size == other.size && self.ranks().eq(other.ranks())
    }

    pub fn count_empty(&self) -> usize { self.cells.iter().filter(|c| c.is_empty()).count() }

    pub fn count_occupied(&self) -> usize { self.cells.len() - self.count_empty() }

    /// Highest rank on the board (0 if empty).
    pub fn highest_rank(&self) -> Rank { self.ranks().max().unwrap_or(0) }

    /// Displayed magnitude of the highest tile (0 if empty).
    pub fn highest_value(&self) -> u64 { tile_value(self.highest_rank()).unwrap_or(0) }

    /// Board mirrored along its main diagonal.
    pub fn transpose(&self) -> Board {
        let n = self.size;
        let cells = (0..n * n).map(|idx| self.cells[(idx % n) * n + idx / n]).collect();
        Board { size: n, cells }
    }

    /// Board with every row reversed.
    pub fn reverse_rows(&self) -> Board {
        let cells = self.cells.chunks(self.size.max(1)).flat_map(|row| row.iter().rev().copied()).collect();
        Board { size: self.size, cells }
    }

    /// Apply the per-line combine toward `dir` and return the result, changed or not.
    ///
    /// Padding cells get fresh keys from `rng`. Use [`Board::shift`] to also
    /// detect no-op moves.
    pub fn slide<R: Rng + ?Sized>(&self, dir: Direction, rng: &mut R) -> (Board, Score) {
        let n = self.size;
        let (reversed, transposed) = dir.orientation();
        let mut cells = vec![Cell::default(); n * n];
        let mut total: Score = 0;
        for i in 0..n {
            let mut values = self.line(i, transposed);
            if reversed { values.reverse(); }
            let (combined, score) = line::combine(&values);
            total += score;
            let mut out = line::pad(combined, n, rng).expect("combine never grows a line past the board size");
            if reversed { out.reverse(); }
            for (j, cell) in out.into_iter().enumerate() {
                let idx = if transposed { j * n + i } else { i * n + j };
                cells[idx] = cell;
            }
        }
        (Board { size: n, cells }, total)
    }

    /// Slide/merge toward `dir`.
    ///
    /// Returns `None` when no rank changes (an illegal move), otherwise the new
    /// board and the score gained.
    pub fn shift<R: Rng + ?Sized>(&self, dir: Direction, rng: &mut R) -> Option<(Board, Score)> {
        let (moved, score) = self.slide(dir, rng);
        if self.same_ranks(&moved) { None } else { Some((moved, score)) }
    }

    /// Whether `dir` is a legal move. Draws no randomness.
    pub fn can_move(&self, dir: Direction) -> bool {
        let (reversed, transposed) = dir.orientation();
        (0..self.size).any(|i| {
            let mut values = self.line(i, transposed);
            if reversed { values.reverse(); }
            line::changes(&values)
        })
    }

    /// True if no direction changes the rank layout.
    ///
    /// An all-empty board counts as over: nothing can slide.
    pub fn is_game_over(&self) -> bool { Direction::ALL.iter().all(|&dir| !self.can_move(dir)) }

    /// Fill one uniformly chosen empty cell with rank 1 (90%) or rank 2 (10%)
    /// and a fresh key. A full board is returned unchanged.
    ///
    /// ```
    /// use ai_987::engine::Board;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::empty(&mut rng).with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Board {
        let empty: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(|(idx, _)| idx)
            .collect();
        if empty.is_empty() {
            return self.clone();
        }
        let idx = empty[rng.gen_range(0..empty.len())];
        let rank = generate_random_rank(rng);
        let mut cells = self.cells.clone();
        cells[idx] = Cell::new(rank, random_key(rng));
        Board { size: self.size, cells }
    }

    fn line(&self, i: usize, transposed: bool) -> Vec<Cell> {
        if transposed { self.column(i) } else { self.row(i).to_vec() }
    }
}

fn generate_random_rank<R: Rng + ?Sized>(rng: &mut R) -> Rank { if rng.gen_range(0..10) < 9 { 1 } else { 2 } }

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<Rank>> = (0..self.size).map(|i| self.row(i).iter().map(|c| c.rank).collect()).collect();
        write!(f, "Board({rows:?})")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(8 * self.size);
        writeln!(f)?;
        for i in 0..self.size {
            if i > 0 { writeln!(f, "{separator}")?; }
            let row: Vec<String> = self.row(i).iter().map(format_cell).collect();
            writeln!(f, "{}", row.join("|"))?;
        }
        Ok(())
    }
}

fn format_cell(cell: &Cell) -> String {
    match (cell.rank, cell.value()) {
        (0, _) => " ".repeat(7),
        (_, Some(v)) => format!("{v:^7}"),
        (r, None) => format!("{:^7}", format!("r{r}")),
    }
}
