//! One autoplayed board.
//!
//! A [`Game`] owns a board, its falling piece, the cached steering target and
//! a seeded RNG. Each call to [`Game::tick`] advances the simulation exactly one
//! step:
//!
//! 1. compute the steering target once per piece (lazily)
//! 2. shift one column toward the target column, if legal
//! 3. once the piece is at or below `rotation_min_row`, advance one rotation
//!    step toward the target rotation, if legal
//! 4. fall one row, or lock the piece and spawn the next one
//!
//! Locking stamps only the visible cells. When the stack leaves no room for a
//! new piece, or a lock cuts off blocks above row 0 and the stack still
//! reaches row 0 after clearing, the board is reset to empty and play
//! continues.

use tracing::{debug, warn};

use curtain_core::pieces::{shape_rotations, Blocks, Rotations};
use curtain_core::{Board, SimpleRng};
use curtain_frame::Frame;

use crate::place::{self, PlaceError, Target, Weights};
use crate::types::{
    PieceKind, Rgb, DISPLAY_ROWS, HELP_THRESHOLD, PALETTE, ROTATION_MIN_ROW, SPAWN_ROW,
};

/// Rules shared by every board of a display.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub rows: u8,
    /// Tallest-column height at which spawns switch to the global search
    pub help_threshold: u8,
    /// Rotation steering waits until the anchor row reaches this value
    pub rotation_min_row: i8,
    /// Steer pieces toward planned targets; when false pieces fall straight
    pub autoplay: bool,
    pub weights: Weights,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DISPLAY_ROWS,
            help_threshold: HELP_THRESHOLD,
            rotation_min_row: ROTATION_MIN_ROW,
            autoplay: true,
            weights: Weights::default(),
        }
    }
}

/// Where a board sits on the display and how it is seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSlot {
    pub name: String,
    /// First display column owned by this board
    pub col_offset: u8,
    pub cols: u8,
    pub seed: u32,
}

impl BoardSlot {
    pub fn new(name: impl Into<String>, col_offset: u8, cols: u8, seed: u32) -> Self {
        Self {
            name: name.into(),
            col_offset,
            cols,
            seed,
        }
    }

    /// Display columns covered, as a half-open range
    pub fn col_range(&self) -> std::ops::Range<u16> {
        self.col_offset as u16..self.col_offset as u16 + self.cols as u16
    }
}

/// The falling piece.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePiece {
    pub kind: PieceKind,
    /// Index into `rotations`
    pub rotation: usize,
    pub row: i8,
    pub col: i8,
    pub color: Rgb,
    rotations: Rotations,
}

impl ActivePiece {
    fn new(kind: PieceKind, rotation: usize, col: i8, color: Rgb) -> Self {
        Self {
            kind,
            rotation,
            row: SPAWN_ROW,
            col,
            color,
            rotations: shape_rotations(kind),
        }
    }

    /// Blocks of the current rotation
    pub fn blocks(&self) -> Blocks {
        self.rotations[self.rotation % self.rotations.len()]
    }

    /// Number of distinct rotations of this shape
    pub fn rotation_count(&self) -> usize {
        self.rotations.len()
    }

    /// Absolute `(row, col)` cells covered by the piece
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        let (row, col) = (self.row, self.col);
        self.rotations[self.rotation % self.rotations.len()]
            .iter()
            .map(move |&(dr, dc)| (row + dr, col + dc))
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// The piece moved down one row
    Fell,
    /// The piece locked; the next piece is already spawned
    Locked { rows_cleared: usize },
    /// The stack topped out; the board was emptied
    Reset,
}

/// Running counters, reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameStats {
    pub ticks: u64,
    pub locked_pieces: u32,
    pub rows_cleared: u32,
    pub resets: u32,
}

/// One autoplayed board.
#[derive(Debug, Clone)]
pub struct Game {
    slot: BoardSlot,
    config: GameConfig,
    board: Board,
    rng: SimpleRng,
    active: Option<ActivePiece>,
    target: Option<Target>,
    stats: GameStats,
}

impl Game {
    /// Create a game with an empty board and its first piece spawned.
    pub fn new(slot: BoardSlot, config: GameConfig) -> Self {
        let board = Board::new(config.rows, slot.cols);
        let rng = SimpleRng::new(slot.seed);
        let mut game = Self {
            slot,
            config,
            board,
            rng,
            active: None,
            target: None,
            stats: GameStats::default(),
        };
        if let Err(e) = game.spawn() {
            warn!(board = %game.slot.name, code = e.code(), "cannot spawn on an empty board");
        }
        game
    }

    pub fn name(&self) -> &str {
        &self.slot.name
    }

    pub fn slot(&self) -> &BoardSlot {
        &self.slot
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for setting up positions in tests
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn stats(&self) -> GameStats {
        self.stats
    }

    /// Column where random spawns enter
    pub fn start_col(&self) -> i8 {
        (self.board.cols() / 2) as i8 - 1
    }

    /// Replace the falling piece with `kind` in its default rotation at `col`.
    pub fn spawn_kind(&mut self, kind: PieceKind, col: i8) -> Result<(), PlaceError> {
        let color = self.draw_color();
        self.place_new(ActivePiece::new(kind, 0, col, color))
    }

    /// Spawn the next piece.
    ///
    /// Below the help threshold a random shape enters at the start column;
    /// at or above it the global search picks shape, rotation and column.
    pub fn spawn(&mut self) -> Result<(), PlaceError> {
        self.target = None;
        self.active = None;

        let assist =
            self.config.autoplay && self.board.max_height() >= self.config.help_threshold;
        let (kind, rotation, col) = if assist {
            let best = place::best_any(&self.board, &self.config.weights)?;
            debug!(
                board = %self.slot.name,
                kind = best.kind.as_str(),
                col = best.target.col,
                score = best.score,
                "assist spawn"
            );
            (best.kind, best.target.rotation, best.target.col)
        } else {
            let col = self.start_col();
            (self.draw_spawnable(col)?, 0, col)
        };

        let color = self.draw_color();
        self.place_new(ActivePiece::new(kind, rotation, col, color))
    }

    fn place_new(&mut self, piece: ActivePiece) -> Result<(), PlaceError> {
        self.target = None;
        if !self.board.can_place(&piece.blocks(), piece.row, piece.col) {
            self.active = None;
            return Err(PlaceError::SpawnBlocked);
        }
        self.active = Some(piece);
        Ok(())
    }

    /// Draw a random shape, walking the remaining shapes in order when the
    /// drawn one does not fit at `col`.
    fn draw_spawnable(&mut self, col: i8) -> Result<PieceKind, PlaceError> {
        let n = PieceKind::ALL.len();
        let first = self.rng.next_range(n as u32) as usize;
        (0..n)
            .map(|i| PieceKind::ALL[(first + i) % n])
            .find(|&kind| self.board.can_place(&shape_rotations(kind)[0], SPAWN_ROW, col))
            .ok_or(PlaceError::PlacementExhausted)
    }

    fn draw_color(&mut self) -> Rgb {
        self.rng.choose(&PALETTE).copied().unwrap_or(PALETTE[0])
    }

    /// Advance the simulation by one step.
    pub fn tick(&mut self) -> TickEvent {
        self.stats.ticks += 1;
        let Some(mut piece) = self.active.take() else {
            return self.reset();
        };

        if self.config.autoplay {
            self.steer(&mut piece);
        }

        if self.board.can_place(&piece.blocks(), piece.row + 1, piece.col) {
            piece.row += 1;
            self.active = Some(piece);
            TickEvent::Fell
        } else {
            self.lock_piece(piece)
        }
    }

    fn steer(&mut self, piece: &mut ActivePiece) {
        let target = match self.target {
            Some(t) => t,
            None => {
                let weights = &self.config.weights;
                let t = place::best_for_kind(&self.board, piece.kind, piece.row, weights)
                    .map(|p| p.target)
                    .unwrap_or(Target {
                        rotation: piece.rotation,
                        col: piece.col,
                    });
                self.target = Some(t);
                t
            }
        };

        let blocks = piece.blocks();
        if piece.col < target.col && self.board.can_place(&blocks, piece.row, piece.col + 1) {
            piece.col += 1;
        } else if piece.col > target.col && self.board.can_place(&blocks, piece.row, piece.col - 1)
        {
            piece.col -= 1;
        }

        // A target rotation outside this shape's rotation list is unreachable.
        if piece.rotation != target.rotation
            && target.rotation < piece.rotation_count()
            && piece.row >= self.config.rotation_min_row
        {
            let next = (piece.rotation + 1) % piece.rotation_count();
            if self.board.can_place(&piece.rotations[next], piece.row, piece.col) {
                piece.rotation = next;
            }
        }
    }

    /// Stamp the visible cells, count the lock and clear full rows, then
    /// spawn the next piece.
    ///
    /// Blocks above row 0 are cut off by the stamp. If that happened and the
    /// stack still reaches row 0 after clearing, the board is reset.
    fn lock_piece(&mut self, piece: ActivePiece) -> TickEvent {
        let cut_off = piece.cells().any(|(r, _)| r < 0);

        self.board.stamp(&piece.blocks(), piece.row, piece.col, piece.color);
        self.stats.locked_pieces += 1;
        let rows_cleared = self.board.clear_full_rows();
        self.stats.rows_cleared += rows_cleared as u32;
        if rows_cleared > 0 {
            debug!(
                board = %self.slot.name,
                rows_cleared,
                total = self.stats.rows_cleared,
                "rows cleared"
            );
        }

        if cut_off && self.board.max_height() >= self.board.rows() {
            warn!(
                board = %self.slot.name,
                locked_pieces = self.stats.locked_pieces,
                "stack reached the top; resetting board"
            );
            return self.reset();
        }

        match self.spawn() {
            Ok(()) => TickEvent::Locked { rows_cleared },
            Err(e) => {
                warn!(
                    board = %self.slot.name,
                    code = e.code(),
                    locked_pieces = self.stats.locked_pieces,
                    "{}; resetting board",
                    e.message()
                );
                self.reset()
            }
        }
    }

    /// Empty the board and spawn a fresh piece.
    pub fn reset(&mut self) -> TickEvent {
        self.board.clear();
        self.stats.resets += 1;
        if let Err(e) = self.spawn() {
            warn!(board = %self.slot.name, code = e.code(), "cannot spawn after reset");
        }
        TickEvent::Reset
    }

    /// Draw locked cells and the falling piece into `frame` at this board's
    /// column offset. Does not clear the frame.
    pub fn render(&self, frame: &mut Frame) {
        let offset = self.slot.col_offset as i32 + 1;
        for r in 0..self.board.rows() as i8 {
            for c in 0..self.board.cols() as i8 {
                let color = self.board.color(r, c).unwrap_or_default();
                frame.put(r as i32 + 1, c as i32 + offset, color);
            }
        }
        if let Some(piece) = &self.active {
            for (r, c) in piece.cells() {
                frame.put(r as i32 + 1, c as i32 + offset, piece.color);
            }
        }
    }
}
