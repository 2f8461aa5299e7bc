use crate::{rules, Error, Result, Strategy};
use std::ops::{Index, IndexMut};

/// Dense field of cells stored as one row-major buffer.
///
/// Cells of a generation are `0` (dead) or `1` (alive). The same type also
/// carries intermediate convolution sums, which stay below `10`.
///
/// Structural transforms take the grid by value and hand back a new one, so
/// the previous buffer is released as soon as the transform returns.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    cells: Vec<u8>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Grid of dead cells.
    pub fn blank(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![0; rows * cols],
            rows,
            cols,
        }
    }

    /// Grid where every cell is an independent `prng() mod 2`, filled row by row.
    ///
    /// `seed` - random seed (if `None`, then random seed is generated)
    pub fn random(rows: usize, cols: usize, seed: Option<u64>) -> Self {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        let mut rng = if let Some(x) = seed {
            ChaCha8Rng::seed_from_u64(x)
        } else {
            ChaCha8Rng::from_entropy()
        };
        let cells = (0..rows * cols)
            .map(|_| (rng.gen::<u32>() % 2) as u8)
            .collect();
        Self { cells, rows, cols }
    }

    pub fn from_cells(rows: usize, cols: usize, cells: Vec<u8>) -> Result<Self> {
        if cells.len() != rows * cols {
            return Err(Error::ShapeMismatch {
                rows,
                cols,
                len: cells.len(),
            });
        }
        Ok(Self { cells, rows, cols })
    }

    /// Replaces the contents with `cells`; the shape never changes.
    pub fn set(&mut self, cells: &[u8]) -> Result<()> {
        if cells.len() != self.cells.len() {
            return Err(Error::ShapeMismatch {
                rows: self.rows,
                cols: self.cols,
                len: cells.len(),
            });
        }
        self.cells.copy_from_slice(cells);
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    pub fn into_cells(self) -> Vec<u8> {
        self.cells
    }

    /// Panics if `(row, col)` lies outside the grid.
    pub fn at(&self, row: usize, col: usize) -> u8 {
        self.cells[self.offset(row, col)]
    }

    /// Panics if `(row, col)` lies outside the grid.
    pub fn at_mut(&mut self, row: usize, col: usize) -> &mut u8 {
        let i = self.offset(row, col);
        &mut self.cells[i]
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({}, {}) is outside a {}x{} grid",
            row,
            col,
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    pub fn row(&self, row: usize) -> &[u8] {
        assert!(row < self.rows, "row {} of {}", row, self.rows);
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        assert!(row < self.rows, "row {} of {}", row, self.rows);
        &mut self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.rows).map(move |row| self.row(row))
    }

    /// Copies a column out into a contiguous buffer.
    pub fn column(&self, col: usize) -> Vec<u8> {
        (0..self.rows).map(|row| self.at(row, col)).collect()
    }

    pub fn set_column(&mut self, col: usize, values: &[u8]) {
        assert_eq!(values.len(), self.rows, "column length");
        for (row, &value) in values.iter().enumerate() {
            *self.at_mut(row, col) = value;
        }
    }

    /// Number of alive cells.
    pub fn population(&self) -> usize {
        self.cells.iter().map(|&c| c as usize).sum()
    }

    fn count_neibs(&self, row: usize, col: usize) -> u8 {
        let r1 = if row == 0 { self.rows - 1 } else { row - 1 };
        let r2 = if row == self.rows - 1 { 0 } else { row + 1 };
        let c1 = if col == 0 { self.cols - 1 } else { col - 1 };
        let c2 = if col == self.cols - 1 { 0 } else { col + 1 };
        self.at(r1, c1)
            + self.at(r1, col)
            + self.at(r1, c2)
            + self.at(row, c1)
            + self.at(row, c2)
            + self.at(r2, c1)
            + self.at(r2, col)
            + self.at(r2, c2)
    }

    /// Advances the whole torus by one generation.
    pub fn update(&mut self) {
        self.update_with(Strategy::Direct);
    }

    pub fn update_with(&mut self, strategy: Strategy) {
        if self.cells.is_empty() {
            return;
        }
        match strategy {
            Strategy::Direct => self.update_direct(),
            Strategy::Separable => self.update_separable(),
        }
    }

    fn update_direct(&mut self) {
        let mut next = vec![0; self.cells.len()];
        for row in 0..self.rows {
            for col in 0..self.cols {
                let neibs = self.count_neibs(row, col);
                next[row * self.cols + col] = rules::next_state(self.at(row, col), neibs);
            }
        }
        self.cells = next;
    }

    fn update_separable(&mut self) {
        let mut padded = self.clone().with_ghost_rows();
        padded.wrap_ghost_rows();
        let mut padded = padded.convolve_rows().with_ghost_cols();
        padded.wrap_ghost_cols();
        let next = rules::apply_sums(self, padded.convolve_cols());
        *self = next;
    }

    /// Grows the grid by periodic tiling: `new[i][j] = old[i % rows][j % cols]`.
    pub fn pad(self, new_rows: usize, new_cols: usize) -> Self {
        assert!(self.rows > 0 && self.cols > 0, "cannot tile an empty grid");
        let mut cells = Vec::with_capacity(new_rows * new_cols);
        for i in 0..new_rows {
            let src = self.row(i % self.rows);
            cells.extend((0..new_cols).map(|j| src[j % self.cols]));
        }
        Self {
            cells,
            rows: new_rows,
            cols: new_cols,
        }
    }

    /// Keeps the top-left `size x size` block.
    pub fn unpad(self, size: usize) -> Self {
        assert!(
            size <= self.rows && size <= self.cols,
            "cannot crop a {}x{} grid to {}x{}",
            self.rows,
            self.cols,
            size,
            size
        );
        let mut cells = Vec::with_capacity(size * size);
        for row in self.row_iter().take(size) {
            cells.extend_from_slice(&row[..size]);
        }
        Self {
            cells,
            rows: size,
            cols: size,
        }
    }

    /// Adds one zeroed ghost row above and below.
    pub fn with_ghost_rows(self) -> Self {
        let mut cells = vec![0; (self.rows + 2) * self.cols];
        cells[self.cols..(self.rows + 1) * self.cols].copy_from_slice(&self.cells);
        Self {
            cells,
            rows: self.rows + 2,
            cols: self.cols,
        }
    }

    /// Adds one zeroed ghost column on the left and on the right.
    pub fn with_ghost_cols(self) -> Self {
        let w = self.cols + 2;
        let mut cells = vec![0; self.rows * w];
        for (dst, src) in cells.chunks_exact_mut(w).zip(self.row_iter()) {
            dst[1..w - 1].copy_from_slice(src);
        }
        Self {
            cells,
            rows: self.rows,
            cols: w,
        }
    }

    /// Fills ghost rows from the opposite edge, as a single tile on a torus would see them.
    pub fn wrap_ghost_rows(&mut self) {
        let (h, w) = (self.rows, self.cols);
        assert!(h >= 3, "no ghost rows to wrap");
        self.cells.copy_within((h - 2) * w..(h - 1) * w, 0);
        self.cells.copy_within(w..2 * w, (h - 1) * w);
    }

    pub fn wrap_ghost_cols(&mut self) {
        let w = self.cols;
        assert!(w >= 3, "no ghost columns to wrap");
        for row in self.cells.chunks_exact_mut(w) {
            row[0] = row[w - 2];
            row[w - 1] = row[1];
        }
    }

    /// Applies the `[1, 1, 1]` kernel down each column, dropping the two ghost rows.
    pub fn convolve_rows(self) -> Self {
        assert!(self.rows >= 3, "vertical pass needs ghost rows");
        let (h, w) = (self.rows - 2, self.cols);
        let mut cells = Vec::with_capacity(h * w);
        for i in 0..h {
            let (a, b, c) = (self.row(i), self.row(i + 1), self.row(i + 2));
            cells.extend((0..w).map(|j| a[j] + b[j] + c[j]));
        }
        Self {
            cells,
            rows: h,
            cols: w,
        }
    }

    /// Applies the `[1, 1, 1]` kernel along each row, dropping the two ghost columns.
    pub fn convolve_cols(self) -> Self {
        assert!(self.cols >= 3, "horizontal pass needs ghost columns");
        let (h, w) = (self.rows, self.cols - 2);
        let mut cells = Vec::with_capacity(h * w);
        for row in self.row_iter() {
            cells.extend(row.windows(3).map(|x| x[0] + x[1] + x[2]));
        }
        Self {
            cells,
            rows: h,
            cols: w,
        }
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = u8;

    fn index(&self, (row, col): (usize, usize)) -> &u8 {
        &self.cells[self.offset(row, col)]
    }
}

impl IndexMut<(usize, usize)> for Grid {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut u8 {
        self.at_mut(row, col)
    }
}
