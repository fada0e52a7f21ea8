//! Toroidal binary grid and seeding.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::EngineError;

/// Square binary grid whose edges wrap in both directions.
///
/// Cells are stored row-major and always hold `0` or `1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Grid {
    side_length: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Construct an all-zero grid.
    pub fn zeros(side_length: usize) -> Result<Self, EngineError> {
        let total = cell_count(side_length)?;
        Ok(Self {
            side_length,
            cells: vec![0; total],
        })
    }

    /// Construct a grid from explicit rows.
    ///
    /// Every row must have as many entries as there are rows and every entry
    /// must be `0` or `1`.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, EngineError> {
        let side_length = rows.len();
        let total = cell_count(side_length)?;
        let mut cells = Vec::with_capacity(total);
        for row in rows {
            let row = row.as_ref();
            if row.len() != side_length {
                return Err(EngineError::InvalidConfig("grid rows must form a square"));
            }
            if row.iter().any(|&cell| cell > 1) {
                return Err(EngineError::InvalidConfig("grid cells must be 0 or 1"));
            }
            cells.extend_from_slice(row);
        }
        Ok(Self { side_length, cells })
    }

    /// Wraps raw cells produced by a rule pass; the caller upholds the invariants.
    pub(crate) fn from_cells(side_length: usize, cells: Vec<u8>) -> Self {
        debug_assert_eq!(cells.len(), side_length * side_length);
        Self { side_length, cells }
    }

    #[must_use]
    pub const fn side_length(&self) -> usize {
        self.side_length
    }

    /// Maps any signed index onto `0..side_length`.
    #[inline]
    #[must_use]
    pub fn wrap(&self, index: isize) -> usize {
        index.rem_euclid(self.side_length as isize) as usize
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        row * self.side_length + col
    }

    /// Cell value at `(row, col)`, wrapping both coordinates.
    #[must_use]
    pub fn get(&self, row: isize, col: isize) -> u8 {
        self.cells[self.offset(self.wrap(row), self.wrap(col))]
    }

    /// Row-major cell storage.
    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// A single row, wrapping the row index.
    #[must_use]
    pub fn row(&self, row: usize) -> &[u8] {
        let start = (row % self.side_length) * self.side_length;
        &self.cells[start..start + self.side_length]
    }

    /// Iterate rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.cells.chunks_exact(self.side_length)
    }

    /// Number of cells set to `1`.
    #[must_use]
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == 1).count()
    }

    /// Number of cells set to `1` in column `col` (wrapped).
    #[must_use]
    pub fn column_population(&self, col: usize) -> usize {
        let col = col % self.side_length;
        self.rows().filter(|row| row[col] == 1).count()
    }

    /// Per-column populations, left to right.
    #[must_use]
    pub fn column_populations(&self) -> Vec<usize> {
        let mut sums = vec![0usize; self.side_length];
        for row in self.rows() {
            for (sum, &cell) in sums.iter_mut().zip(row) {
                *sum += usize::from(cell);
            }
        }
        sums
    }

    /// Snapshot of the 3×3 toroidal neighborhood centered on `(row, col)`.
    #[must_use]
    pub fn neighborhood(&self, row: usize, col: usize) -> NeighborhoodSample {
        let n = self.side_length;
        let row = row % n;
        let col = col % n;
        let up = if row == 0 { n - 1 } else { row - 1 };
        let down = if row + 1 == n { 0 } else { row + 1 };
        let left = if col == 0 { n - 1 } else { col - 1 };
        let right = if col + 1 == n { 0 } else { col + 1 };
        let at = |r: usize, c: usize| self.cells[self.offset(r, c)];

        NeighborhoodSample {
            center: at(row, col),
            top: at(up, col),
            bottom: at(down, col),
            left: at(row, left),
            right: at(row, right),
            top_left: at(up, left),
            top_right: at(up, right),
            bottom_left: at(down, left),
            bottom_right: at(down, right),
        }
    }
}

fn cell_count(side_length: usize) -> Result<usize, EngineError> {
    if side_length == 0 {
        return Err(EngineError::InvalidConfig("side_length must be positive"));
    }
    side_length
        .checked_mul(side_length)
        .ok_or(EngineError::InvalidConfig("side_length is too large"))
}

/// Read-only view of one cell and its eight toroidal neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NeighborhoodSample {
    pub center: u8,
    pub top: u8,
    pub bottom: u8,
    pub left: u8,
    pub right: u8,
    pub top_left: u8,
    pub top_right: u8,
    pub bottom_left: u8,
    pub bottom_right: u8,
}

impl NeighborhoodSample {
    /// Build a sample from a 3×3 block given top row first.
    #[must_use]
    pub const fn from_block(block: [[u8; 3]; 3]) -> Self {
        Self {
            center: block[1][1],
            top: block[0][1],
            bottom: block[2][1],
            left: block[1][0],
            right: block[1][2],
            top_left: block[0][0],
            top_right: block[0][2],
            bottom_left: block[2][0],
            bottom_right: block[2][2],
        }
    }

    /// Sum of the right column: right, top-right, bottom-right.
    #[must_use]
    pub const fn right_sum(&self) -> u8 {
        self.right + self.top_right + self.bottom_right
    }

    /// Sum of the left column: left, top-left, bottom-left.
    #[must_use]
    pub const fn left_sum(&self) -> u8 {
        self.left + self.top_left + self.bottom_left
    }
}

/// Seed a grid with exactly `⌊N²/2⌋` live cells at uniformly random positions.
///
/// All N² coordinates are shuffled and the first half become `1`, so the
/// live/dead ratio is exact on every call.
pub fn seed<R: Rng + ?Sized>(side_length: usize, rng: &mut R) -> Result<Grid, EngineError> {
    let total = cell_count(side_length)?;
    let mut order: Vec<usize> = (0..total).collect();
    order.shuffle(rng);

    let mut cells = vec![0u8; total];
    for &index in &order[..total / 2] {
        cells[index] = 1;
    }
    Ok(Grid::from_cells(side_length, cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn seeding_sets_exactly_half() {
        for side in 1..=17 {
            for rng_seed in [0u64, 1, 0xDEAD_BEEF] {
                let mut rng = SmallRng::seed_from_u64(rng_seed);
                let grid = seed(side, &mut rng).expect("grid");
                let total = side * side;
                assert_eq!(grid.population(), total / 2, "side {side}");
                assert_eq!(
                    grid.cells().iter().filter(|&&c| c == 0).count(),
                    total - total / 2
                );
            }
        }
    }

    #[test]
    fn seeding_rejects_empty_grid() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(
            seed(0, &mut rng),
            Err(EngineError::InvalidConfig("side_length must be positive"))
        );
    }

    #[test]
    fn seeding_varies_placement_with_rng() {
        let a = seed(12, &mut SmallRng::seed_from_u64(1)).expect("grid");
        let b = seed(12, &mut SmallRng::seed_from_u64(2)).expect("grid");
        let again = seed(12, &mut SmallRng::seed_from_u64(1)).expect("grid");
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[test]
    fn indices_wrap_in_both_directions() {
        let grid = seed(5, &mut SmallRng::seed_from_u64(11)).expect("grid");
        for i in 0..5isize {
            assert_eq!(grid.get(-1, i), grid.get(4, i));
            assert_eq!(grid.get(i, -1), grid.get(i, 4));
            assert_eq!(grid.get(5, i), grid.get(0, i));
            assert_eq!(grid.get(i, 5 + 5), grid.get(i, 0));
            assert_eq!(grid.get(-6, i), grid.get(4, i));
        }
        assert_eq!(grid.wrap(-1), 4);
        assert_eq!(grid.wrap(-11), 4);
        assert_eq!(grid.wrap(7), 2);
    }

    #[test]
    fn neighborhood_wraps_at_corners() {
        let grid = Grid::from_rows(&[[1u8, 0, 0], [0, 0, 0], [0, 0, 1]]).expect("grid");
        let sample = grid.neighborhood(0, 0);
        assert_eq!(sample.center, 1);
        assert_eq!(sample.top_left, 1);
        assert_eq!(sample.top, 0);
        assert_eq!(sample.bottom_right, 0);

        let sample = grid.neighborhood(2, 2);
        assert_eq!(sample.center, 1);
        assert_eq!(sample.bottom_right, 1);
    }

    #[test]
    fn neighborhood_matches_signed_access() {
        let grid = seed(6, &mut SmallRng::seed_from_u64(21)).expect("grid");
        for row in 0..6usize {
            for col in 0..6usize {
                let (r, c) = (row as isize, col as isize);
                let sample = grid.neighborhood(row, col);
                assert_eq!(sample.top, grid.get(r - 1, c));
                assert_eq!(sample.bottom, grid.get(r + 1, c));
                assert_eq!(sample.left, grid.get(r, c - 1));
                assert_eq!(sample.right, grid.get(r, c + 1));
                assert_eq!(sample.top_left, grid.get(r - 1, c - 1));
                assert_eq!(sample.top_right, grid.get(r - 1, c + 1));
                assert_eq!(sample.bottom_left, grid.get(r + 1, c - 1));
                assert_eq!(sample.bottom_right, grid.get(r + 1, c + 1));
            }
        }
    }

    #[test]
    fn from_rows_validates_shape_and_values() {
        assert!(matches!(
            Grid::from_rows(&[vec![0u8, 1], vec![1]]),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(matches!(
            Grid::from_rows(&[[0u8, 2], [1, 0]]),
            Err(EngineError::InvalidConfig(_))
        ));
        let empty: [[u8; 0]; 0] = [];
        assert!(matches!(
            Grid::from_rows(&empty),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn column_populations_count_ones() {
        let grid = Grid::from_rows(&[[1u8, 1, 0], [1, 0, 0], [1, 0, 1]]).expect("grid");
        assert_eq!(grid.column_populations(), vec![3, 1, 1]);
        assert_eq!(grid.column_population(0), 3);
        assert_eq!(grid.column_population(4), 1);
        assert_eq!(grid.row(1), &[1, 0, 0]);
        assert_eq!(grid.rows().count(), 3);
    }
}
