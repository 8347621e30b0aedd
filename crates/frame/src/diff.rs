//! Frame differ: turns consecutive frames into a list of changed pixels.
//!
//! The curtain is mounted rotated 90 degrees relative to the board, so each
//! changed frame cell `(row, col)` is addressed on the wire as
//! `(col, rows - row + 1)`.

use crate::fb::Frame;
use crate::types::Rgb;

/// One pixel update in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelUpdate {
    pub row: u8,
    pub col: u8,
    pub color: Rgb,
}

/// Map an interior frame cell to display coordinates.
#[inline]
pub fn display_coords(rows: u8, frame_row: usize, frame_col: usize) -> (u8, u8) {
    (frame_col as u8, rows - frame_row as u8 + 1)
}

/// Keeps the previously transmitted frame and diffs new frames against it.
#[derive(Debug, Clone)]
pub struct FrameDiffer {
    last: Frame,
    /// Next diff reports every interior cell
    invalid: bool,
}

impl FrameDiffer {
    /// Start from an all-black display.
    pub fn new(rows: u8, cols: u8) -> Self {
        Self {
            last: Frame::new(rows, cols),
            invalid: false,
        }
    }

    /// Force the next diff to report every interior cell.
    ///
    /// Used after a failed transmission, when the physical display no longer
    /// matches the stored frame.
    pub fn invalidate(&mut self) {
        self.invalid = true;
    }

    /// The frame the next diff compares against.
    pub fn last(&self) -> &Frame {
        &self.last
    }

    /// Collect changed interior cells into `out` (cleared first), row-major,
    /// then store `next` as the previous frame.
    pub fn diff_into(&mut self, next: &Frame, out: &mut Vec<PixelUpdate>) {
        out.clear();
        let full = self.invalid
            || self.last.rows() != next.rows()
            || self.last.cols() != next.cols();
        let rows = next.rows();

        for r in 1..=rows as usize {
            for c in 1..=next.cols() as usize {
                let color = next.get(r, c).unwrap_or_default();
                if full || self.last.get(r, c) != Some(color) {
                    let (row, col) = display_coords(rows, r, c);
                    out.push(PixelUpdate { row, col, color });
                }
            }
        }

        self.last.clone_from(next);
        self.invalid = false;
    }

    /// Allocating convenience wrapper around [`FrameDiffer::diff_into`].
    pub fn diff(&mut self, next: &Frame) -> Vec<PixelUpdate> {
        let mut out = Vec::new();
        self.diff_into(next, &mut out);
        out
    }
}
