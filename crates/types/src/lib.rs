//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (board logic, frame rendering, wire encoding, dispatch).
//!
//! # Display Dimensions
//!
//! The curtain is driven as a grid of individually addressable pixels:
//!
//! - **Rows**: 18 visible rows (indexed 0-17, top to bottom)
//! - **Columns**: 20 visible columns, split into two boards of 10
//! - **Spawn row**: -2 (pieces enter above the visible area)
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `FPS` | 3 | Game ticks per second |
//! | `INIT_DELAY_MS` | 50 | Pause after each init command |
//!
//! # Planner Weights
//!
//! | Constant | Value | Penalizes |
//! |----------|-------|-----------|
//! | `ALPHA` | 1.0 | distance of average height from `rows / 2` |
//! | `BETA` | 5.0 | holes |
//! | `GAMMA` | 2.0 | tallest minus shortest column |
//!
//! # Examples
//!
//! ```
//! use curtain_types::{PieceKind, Rgb, DISPLAY_COLS, DISPLAY_ROWS};
//!
//! // Parse from string (case-insensitive)
//! assert_eq!(PieceKind::from_str("o"), Some(PieceKind::O));
//!
//! // Colors
//! assert_eq!(Rgb::BLACK, Rgb::new(0, 0, 0));
//!
//! // Display dimensions
//! assert_eq!(DISPLAY_ROWS, 18);
//! assert_eq!(DISPLAY_COLS, 20);
//! ```

/// Visible display rows (18)
pub const DISPLAY_ROWS: u8 = 18;

/// Visible display columns (20)
pub const DISPLAY_COLS: u8 = 20;

/// Columns owned by each half of a split display (10)
pub const HALF_COLS: u8 = DISPLAY_COLS / 2;

/// Game ticks per second
pub const FPS: u32 = 3;

/// Row at which new pieces spawn (above the visible area)
pub const SPAWN_ROW: i8 = -2;

/// Tallest-column height at which spawning switches to assist mode
pub const HELP_THRESHOLD: u8 = 15;

/// Pieces may only rotate once their anchor row reaches this value
pub const ROTATION_MIN_ROW: i8 = 3;

/// Weight for the distance between average height and target height
pub const ALPHA: f32 = 1.0;

/// Weight for holes
pub const BETA: f32 = 5.0;

/// Weight for the height spread (tallest minus shortest column)
pub const GAMMA: f32 = 2.0;

/// Pause after each per-LED mode init command (50ms)
pub const INIT_DELAY_MS: u64 = 50;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Unlit pixel.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color bytes in wire order.
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Piece colors, one drawn per spawned piece.
pub const PALETTE: [Rgb; 6] = [
    Rgb::new(10, 0, 80),
    Rgb::new(56, 0, 200),
    Rgb::new(200, 0, 150),
    Rgb::new(108, 0, 142),
    Rgb::new(180, 0, 82),
    Rgb::new(95, 24, 13),
];

/// The seven tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    /// Every kind in planner enumeration order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use curtain_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("T"), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "l" => Some(PieceKind::L),
            "j" => Some(PieceKind::J),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::L => "l",
            PieceKind::J => "j",
            PieceKind::S => "s",
            PieceKind::Z => "z",
        }
    }
}
