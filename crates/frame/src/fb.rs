//! Frame matrix rendered once per tick.

use crate::types::Rgb;

/// Color matrix for one tick: `rows x cols` visible cells wrapped in a
/// 1-cell border on every side.
///
/// Frame coordinates include the border, so the visible area spans rows
/// `1..=rows` and columns `1..=cols`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    rows: u8,
    cols: u8,
    cells: Vec<Rgb>,
}

impl Frame {
    pub fn new(rows: u8, cols: u8) -> Self {
        let len = (rows as usize + 2) * (cols as usize + 2);
        Self {
            rows,
            cols,
            cells: vec![Rgb::BLACK; len],
        }
    }

    /// Visible rows (border excluded)
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Visible columns (border excluded)
    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// Total height including the border
    pub fn height(&self) -> usize {
        self.rows as usize + 2
    }

    /// Total width including the border
    pub fn width(&self) -> usize {
        self.cols as usize + 2
    }

    pub fn cells(&self) -> &[Rgb] {
        &self.cells
    }

    #[inline(always)]
    fn idx(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        Some(row * self.width() + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Rgb> {
        self.idx(row, col).map(|i| self.cells[i])
    }

    pub fn set(&mut self, row: usize, col: usize, color: Rgb) {
        if let Some(i) = self.idx(row, col) {
            self.cells[i] = color;
        }
    }

    /// Draw at signed frame coordinates; anything outside the frame is
    /// ignored.
    pub fn put(&mut self, row: i32, col: i32, color: Rgb) {
        if row < 0 || col < 0 {
            return;
        }
        self.set(row as usize, col as usize, color);
    }

    pub fn clear(&mut self, color: Rgb) {
        self.cells.fill(color);
    }
}
