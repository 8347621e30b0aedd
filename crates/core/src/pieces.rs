//! Pieces module - tetromino shapes and rotation generation
//!
//! Shapes are stored as `(row, col)` offsets from the piece anchor, rows
//! growing downward. Rotations are generated rather than tabulated: each step
//! applies `(r, c) -> (-c, r)` and re-normalizes, so symmetric shapes
//! naturally produce fewer distinct rotations (O: 1, I/S/Z: 2, T/L/J: 4).

use arrayvec::ArrayVec;

use crate::types::PieceKind;

/// Offset of a single block relative to the piece anchor: `(row, col)`
pub type Block = (i8, i8);

/// Shape of a piece - 4 block offsets from the piece anchor
pub type Blocks = [Block; 4];

/// Distinct rotations of one shape (at most 4)
pub type Rotations = ArrayVec<Blocks, 4>;

/// Spawn shape for a piece kind
pub fn base_shape(kind: PieceKind) -> Blocks {
    match kind {
        PieceKind::I => [(0, 0), (1, 0), (2, 0), (3, 0)],
        PieceKind::O => [(0, 0), (0, 1), (1, 0), (1, 1)],
        PieceKind::T => [(0, 1), (1, 0), (1, 1), (1, 2)],
        PieceKind::L => [(0, 0), (1, 0), (2, 0), (2, 1)],
        PieceKind::J => [(0, 1), (1, 1), (2, 1), (2, 0)],
        PieceKind::S => [(0, 1), (0, 2), (1, 0), (1, 1)],
        PieceKind::Z => [(0, 0), (0, 1), (1, 1), (1, 2)],
    }
}

/// Shift blocks so the smallest row and column are both 0, then sort.
///
/// Two block sets describe the same orientation iff their normalized forms
/// are equal.
pub fn normalize(blocks: &Blocks) -> Blocks {
    let min_r = blocks.iter().map(|&(r, _)| r).min().unwrap_or(0);
    let min_c = blocks.iter().map(|&(_, c)| c).min().unwrap_or(0);
    let mut out = blocks.map(|(r, c)| (r - min_r, c - min_c));
    out.sort_unstable();
    out
}

/// Rotate 90 degrees: `(r, c) -> (-c, r)`.
#[inline]
pub fn rotate_once(blocks: &Blocks) -> Blocks {
    blocks.map(|(r, c)| (-c, r))
}

/// Generate the distinct normalized rotations of a shape.
///
/// The first entry is the normalized input. Generation stops as soon as a
/// rotation repeats, so the result never holds duplicates.
pub fn rotations(blocks: &Blocks) -> Rotations {
    let mut out = Rotations::new();
    let mut current = normalize(blocks);
    for _ in 0..4 {
        if out.contains(&current) {
            break;
        }
        out.push(current);
        current = normalize(&rotate_once(&current));
    }
    out
}

/// All rotations of a piece kind, default rotation first
pub fn shape_rotations(kind: PieceKind) -> Rotations {
    rotations(&base_shape(kind))
}

/// Inclusive column extent `(min_col, max_col)` of a shape
pub fn col_span(blocks: &Blocks) -> (i8, i8) {
    let mut min_c = i8::MAX;
    let mut max_c = i8::MIN;
    for &(_, c) in blocks {
        min_c = min_c.min(c);
        max_c = max_c.max(c);
    }
    (min_c, max_c)
}
