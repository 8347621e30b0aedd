//! Several games sharing one display.

use curtain_core::MAX_DIM;
use curtain_frame::Frame;

use crate::game::{BoardSlot, Game, GameConfig, TickEvent};
use crate::types::{Rgb, DISPLAY_COLS, DISPLAY_ROWS, HALF_COLS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A board reaches past the last display column
    OutOfRange { name: String },
    /// Two boards claim the same display column
    Overlap { first: String, second: String },
    /// A board has no columns
    Empty { name: String },
    /// Rows or a board's columns exceed [`MAX_DIM`]
    TooLarge { name: String },
}

impl LayoutError {
    pub fn code(&self) -> &'static str {
        match self {
            LayoutError::OutOfRange { .. } => "out_of_range",
            LayoutError::Overlap { .. } => "overlap",
            LayoutError::Empty { .. } => "empty_board",
            LayoutError::TooLarge { .. } => "too_large",
        }
    }

    pub fn message(&self) -> String {
        match self {
            LayoutError::OutOfRange { name } => format!("board {name} exceeds the display width"),
            LayoutError::Overlap { first, second } => {
                format!("boards {first} and {second} overlap")
            }
            LayoutError::Empty { name } => format!("board {name} has no columns"),
            LayoutError::TooLarge { name } => {
                format!("board {name} exceeds {MAX_DIM} rows or columns")
            }
        }
    }
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for LayoutError {}

/// Default split: two half-width boards with fixed seeds.
pub fn split_slots() -> Vec<BoardSlot> {
    vec![
        BoardSlot::new("left", 0, HALF_COLS, 1),
        BoardSlot::new("right", HALF_COLS, DISPLAY_COLS - HALF_COLS, 2),
    ]
}

/// A set of games laid out side by side on one display.
///
/// Boards must occupy disjoint column ranges; every board draws only into
/// its own range, so rendering order does not matter.
#[derive(Debug, Clone)]
pub struct Engine {
    rows: u8,
    cols: u8,
    games: Vec<Game>,
}

impl Engine {
    pub fn new(
        rows: u8,
        cols: u8,
        slots: Vec<BoardSlot>,
        config: GameConfig,
    ) -> Result<Self, LayoutError> {
        for (i, slot) in slots.iter().enumerate() {
            if rows > MAX_DIM || slot.cols > MAX_DIM {
                return Err(LayoutError::TooLarge {
                    name: slot.name.clone(),
                });
            }
            if slot.cols == 0 {
                return Err(LayoutError::Empty {
                    name: slot.name.clone(),
                });
            }
            if slot.col_range().end > cols as u16 {
                return Err(LayoutError::OutOfRange {
                    name: slot.name.clone(),
                });
            }
            for other in &slots[..i] {
                let (a, b) = (slot.col_range(), other.col_range());
                if a.start < b.end && b.start < a.end {
                    return Err(LayoutError::Overlap {
                        first: other.name.clone(),
                        second: slot.name.clone(),
                    });
                }
            }
        }

        let config = GameConfig { rows, ..config };
        let games = slots
            .into_iter()
            .map(|slot| Game::new(slot, config.clone()))
            .collect();
        Ok(Self { rows, cols, games })
    }

    /// Full-size display split into the default left and right boards.
    pub fn split(config: GameConfig) -> Result<Self, LayoutError> {
        Self::new(DISPLAY_ROWS, DISPLAY_COLS, split_slots(), config)
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn games_mut(&mut self) -> &mut [Game] {
        &mut self.games
    }

    pub fn into_games(self) -> Vec<Game> {
        self.games
    }

    /// A blank frame sized for this display
    pub fn new_frame(&self) -> Frame {
        Frame::new(self.rows, self.cols)
    }

    /// Tick every game once, in slot order.
    pub fn tick(&mut self) -> Vec<TickEvent> {
        self.games.iter_mut().map(Game::tick).collect()
    }

    /// Clear `frame` and draw every game into it.
    pub fn render(&self, frame: &mut Frame) {
        frame.clear(Rgb::BLACK);
        for game in &self.games {
            game.render(frame);
        }
    }
}
