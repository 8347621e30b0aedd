//! Core board logic - pure, deterministic, and testable
//!
//! This crate holds the grid state and piece geometry. It has **no
//! dependencies** on rendering, the wire format, or I/O, which keeps it:
//!
//! - **Deterministic**: Same seed produces identical games
//! - **Testable**: Every rule is checkable on a small board
//! - **Portable**: Usable from the engine, benches, and tests alike
//!
//! # Module Structure
//!
//! - [`board`]: `rows x cols` grid with collision checks, drop simulation and row clearing
//! - [`pieces`]: tetromino shapes and generated rotations
//! - [`rng`]: seeded LCG for piece and color draws
//!
//! # Example
//!
//! ```
//! use curtain_core::{pieces, Board};
//! use curtain_core::types::{PieceKind, Rgb};
//!
//! let mut board = Board::new(6, 4);
//! let o = pieces::base_shape(PieceKind::O);
//!
//! let row = board.drop_row(&o, 0);
//! assert_eq!(row, 4);
//! board.stamp(&o, row, 0, Rgb::new(255, 0, 0));
//! board.stamp(&o, row, 2, Rgb::new(0, 0, 255));
//! assert_eq!(board.clear_full_rows(), 2);
//! assert_eq!(board.occupied_count(), 0);
//! ```

pub mod board;
pub mod pieces;
pub mod rng;

pub use curtain_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, DropOutcome, MAX_DIM};
pub use pieces::{base_shape, rotations, shape_rotations, Blocks, Rotations};
pub use rng::SimpleRng;
