//! Board module - manages one play-field region of the display
//!
//! The board is a `rows x cols` grid where each cell is either empty or holds
//! the color of the piece that locked there. Storage is a pair of flat
//! row-major arrays (occupancy and color) sized once at construction.
//!
//! Coordinates: `(row, col)` where row grows downward from 0 (top) and col
//! grows rightward from 0. Rows above the board (negative) are a spawn buffer:
//! they are always legal for a falling piece and never stored.

use crate::pieces::Blocks;
use crate::types::{Rgb, SPAWN_ROW};

/// Result of dropping a shape onto a copy of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome {
    /// Row at which the shape came to rest
    pub row: i8,
    /// Mean of `heights`
    pub avg_height: f32,
    /// Empty cells with an occupied cell somewhere above them
    pub holes: u32,
    /// Per-column height of the topmost occupied cell (0 for an empty column)
    pub heights: Vec<u8>,
}

impl DropOutcome {
    /// Tallest minus shortest column
    pub fn spread(&self) -> u8 {
        let max = self.heights.iter().copied().max().unwrap_or(0);
        let min = self.heights.iter().copied().min().unwrap_or(0);
        max - min
    }
}

/// Largest supported row or column count. Coordinates are `i8`; an anchor
/// plus a block offset plus one step must stay in range.
pub const MAX_DIM: u8 = (i8::MAX - 4) as u8;

/// The game board - `rows x cols` using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: u8,
    cols: u8,
    /// Row-major occupancy (row * cols + col)
    occupied: Vec<bool>,
    /// Row-major colors; black wherever `occupied` is false
    colors: Vec<Rgb>,
}

impl Board {
    /// Create a new empty board. Dimensions above [`MAX_DIM`] are clamped.
    pub fn new(rows: u8, cols: u8) -> Self {
        let (rows, cols) = (rows.min(MAX_DIM), cols.min(MAX_DIM));
        let len = rows as usize * cols as usize;
        Self {
            rows,
            cols,
            occupied: vec![false; len],
            colors: vec![Rgb::BLACK; len],
        }
    }

    #[inline(always)]
    fn index(&self, row: i8, col: i8) -> Option<usize> {
        if row < 0 || col < 0 || row as u8 >= self.rows || col as u8 >= self.cols {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, row: i8, col: i8) -> bool {
        self.index(row, col).map(|i| self.occupied[i]).unwrap_or(false)
    }

    /// Color at position, `None` if out of bounds
    pub fn color(&self, row: i8, col: i8) -> Option<Rgb> {
        self.index(row, col).map(|i| self.colors[i])
    }

    /// Fill a cell with `Some(color)` or empty it with `None`.
    /// Returns false if out of bounds.
    pub fn set(&mut self, row: i8, col: i8, cell: Option<Rgb>) -> bool {
        let Some(i) = self.index(row, col) else {
            return false;
        };
        match cell {
            Some(color) => {
                self.occupied[i] = true;
                self.colors[i] = color;
            }
            None => {
                self.occupied[i] = false;
                self.colors[i] = Rgb::BLACK;
            }
        }
        true
    }

    /// Whether `blocks` anchored at `(row, col)` fit.
    ///
    /// Every block must sit inside the column range and not below the bottom
    /// row. Blocks above the top (negative rows) never collide.
    pub fn can_place(&self, blocks: &Blocks, row: i8, col: i8) -> bool {
        blocks.iter().all(|&(dr, dc)| {
            let r = row + dr;
            let c = col + dc;
            if c < 0 || c as u8 >= self.cols || (r >= 0 && r as u8 >= self.rows) {
                return false;
            }
            r < 0 || !self.is_occupied(r, c)
        })
    }

    /// Lowest row reachable by dropping `blocks` straight down from the spawn row.
    pub fn drop_row(&self, blocks: &Blocks, col: i8) -> i8 {
        let mut row = SPAWN_ROW;
        while self.can_place(blocks, row + 1, col) {
            row += 1;
        }
        row
    }

    /// Drop `blocks` at `col` on a copy of the board and measure the result.
    ///
    /// Used for scoring only; `self` is never modified.
    pub fn simulate_drop(&self, blocks: &Blocks, col: i8) -> DropOutcome {
        let row = self.drop_row(blocks, col);
        let mut sim = self.clone();
        sim.stamp(blocks, row, col, Rgb::BLACK);
        let (heights, holes) = sim.column_profile();
        let avg_height = if heights.is_empty() {
            0.0
        } else {
            heights.iter().map(|&h| h as f32).sum::<f32>() / heights.len() as f32
        };
        DropOutcome {
            row,
            avg_height,
            holes,
            heights,
        }
    }

    /// Per-column heights and the total hole count
    pub fn column_profile(&self) -> (Vec<u8>, u32) {
        let mut heights = Vec::with_capacity(self.cols as usize);
        let mut holes = 0;
        for c in 0..self.cols as i8 {
            let mut height = 0;
            let mut seen = false;
            for r in 0..self.rows as i8 {
                if self.is_occupied(r, c) {
                    if !seen {
                        height = self.rows - r as u8;
                        seen = true;
                    }
                } else if seen {
                    holes += 1;
                }
            }
            heights.push(height);
        }
        (heights, holes)
    }

    /// Height of the tallest column
    pub fn max_height(&self) -> u8 {
        for r in 0..self.rows as i8 {
            let start = r as usize * self.cols as usize;
            if self.occupied[start..start + self.cols as usize]
                .iter()
                .any(|&o| o)
            {
                return self.rows - r as u8;
            }
        }
        0
    }

    /// Write `blocks` at `(row, col)` into occupancy and color.
    ///
    /// Blocks outside the visible area are dropped. Returns how many cells
    /// were written.
    pub fn stamp(&mut self, blocks: &Blocks, row: i8, col: i8, color: Rgb) -> usize {
        let mut written = 0;
        for &(dr, dc) in blocks {
            if self.set(row + dr, col + dc, Some(color)) {
                written += 1;
            }
        }
        written
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, row: usize) -> bool {
        if row >= self.rows as usize {
            return false;
        }
        let start = row * self.cols as usize;
        self.occupied[start..start + self.cols as usize]
            .iter()
            .all(|&o| o)
    }

    /// Remove every full row, shifting the rows above down and blanking the
    /// top. Returns the number of rows removed.
    ///
    /// Two-pointer pass from the bottom: surviving rows keep their relative
    /// order.
    pub fn clear_full_rows(&mut self) -> usize {
        let width = self.cols as usize;
        let mut write_row = self.rows as usize;
        let mut cleared = 0;

        for read_row in (0..self.rows as usize).rev() {
            if self.is_row_full(read_row) {
                cleared += 1;
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                let src = read_row * width;
                let dst = write_row * width;
                self.occupied.copy_within(src..src + width, dst);
                self.colors.copy_within(src..src + width, dst);
            }
        }

        let top = write_row * width;
        self.occupied[..top].fill(false);
        self.colors[..top].fill(Rgb::BLACK);
        cleared
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|&&o| o).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.occupied.fill(false);
        self.colors.fill(Rgb::BLACK);
    }
}
