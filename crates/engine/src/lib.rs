//! Autoplay engine: placement planner, per-board game state and the
//! multi-board display engine.
//!
//! # Example
//!
//! ```
//! use curtain_engine::{Engine, GameConfig};
//!
//! let mut engine = Engine::split(GameConfig::default()).unwrap();
//! let mut frame = engine.new_frame();
//! for _ in 0..10 {
//!     engine.tick();
//! }
//! engine.render(&mut frame);
//! assert_eq!(frame.rows(), 18);
//! ```

pub mod engine;
pub mod game;
pub mod place;

pub use curtain_types as types;

pub use engine::{split_slots, Engine, LayoutError};
pub use game::{ActivePiece, BoardSlot, Game, GameConfig, GameStats, TickEvent};
pub use place::{best_any, best_for_kind, score, PlaceError, Placement, Target, Weights};
