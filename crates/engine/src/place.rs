//! Placement planner.
//!
//! Scores a candidate `(rotation, column)` by dropping the shape onto a copy
//! of the board:
//!
//! ```text
//! score = alpha * |avg_height - rows/2| + beta * holes + gamma * (max_h - min_h)
//! ```
//!
//! Lower is better. Candidates are enumerated kinds first (in
//! [`PieceKind::ALL`] order), then rotations in generated order, then columns
//! left to right; only a strictly lower score replaces the current best, so
//! ties resolve to the first candidate seen.

use curtain_core::pieces::{col_span, shape_rotations, Blocks};
use curtain_core::Board;

use crate::types::{PieceKind, ALPHA, BETA, GAMMA, SPAWN_ROW};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    /// No shape fits anywhere on the board
    PlacementExhausted,
    /// The freshly spawned piece collides at its spawn position
    SpawnBlocked,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::PlacementExhausted => "placement_exhausted",
            PlaceError::SpawnBlocked => "spawn_blocked",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::PlacementExhausted => "no legal placement for any piece",
            PlaceError::SpawnBlocked => "spawned piece collides with the stack",
        }
    }
}

impl std::fmt::Display for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for PlaceError {}

/// Cost weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            alpha: ALPHA,
            beta: BETA,
            gamma: GAMMA,
        }
    }
}

/// Cached steering goal for the active piece: an index into the shape's
/// rotation list and the anchor column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub rotation: usize,
    pub col: i8,
}

/// A scored candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub kind: PieceKind,
    pub target: Target,
    pub score: f32,
}

/// Cost of dropping `blocks` at `col`.
pub fn score(board: &Board, blocks: &Blocks, col: i8, weights: &Weights) -> f32 {
    let outcome = board.simulate_drop(blocks, col);
    let target_height = board.rows() as f32 / 2.0;
    weights.alpha * (outcome.avg_height - target_height).abs()
        + weights.beta * outcome.holes as f32
        + weights.gamma * outcome.spread() as f32
}

/// Scan every rotation and column of `kind` that is legal at `from_row`,
/// replacing `best` whenever a strictly lower score is found.
fn search_kind(
    board: &Board,
    kind: PieceKind,
    from_row: i8,
    weights: &Weights,
    best: &mut Option<Placement>,
) {
    for (rotation, blocks) in shape_rotations(kind).iter().enumerate() {
        let (min_c, max_c) = col_span(blocks);
        for col in -min_c..board.cols() as i8 - max_c {
            if !board.can_place(blocks, from_row, col) {
                continue;
            }
            let s = score(board, blocks, col, weights);
            if best.as_ref().map_or(true, |b| s < b.score) {
                *best = Some(Placement {
                    kind,
                    target: Target { rotation, col },
                    score: s,
                });
            }
        }
    }
}

/// Best rotation and column for one shape, considering only placements legal
/// from `from_row`.
pub fn best_for_kind(
    board: &Board,
    kind: PieceKind,
    from_row: i8,
    weights: &Weights,
) -> Option<Placement> {
    let mut best = None;
    search_kind(board, kind, from_row, weights, &mut best);
    best
}

/// Global search over every shape, rotation and column from the spawn row.
pub fn best_any(board: &Board, weights: &Weights) -> Result<Placement, PlaceError> {
    let mut best = None;
    for kind in PieceKind::ALL {
        search_kind(board, kind, SPAWN_ROW, weights, &mut best);
    }
    best.ok_or(PlaceError::PlacementExhausted)
}
