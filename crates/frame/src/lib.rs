//! Frame rendering target, frame differ, and curtain wire encoding.
//!
//! The pipeline per tick is:
//!
//! 1. The engine draws every board into a [`Frame`]
//! 2. [`FrameDiffer`] compares it with the previous frame and emits
//!    [`PixelUpdate`]s in display coordinates
//! 3. [`wire::encode_batches`] packs the updates into fixed 54-byte commands
//!
//! Nothing here knows about boards or pieces; the only input is the frame.
//!
//! # Example
//!
//! ```
//! use curtain_frame::{wire, Frame, FrameDiffer};
//! use curtain_frame::types::Rgb;
//!
//! let mut differ = FrameDiffer::new(18, 20);
//! let mut frame = Frame::new(18, 20);
//! frame.set(1, 1, Rgb::new(200, 0, 150));
//!
//! let changed = differ.diff(&frame);
//! assert_eq!(changed.len(), 1);
//! assert_eq!(wire::encode_batches(&changed).len(), 1);
//!
//! // Nothing moved: nothing to send.
//! assert!(differ.diff(&frame).is_empty());
//! ```

pub mod diff;
pub mod fb;
pub mod wire;

pub use curtain_types as types;

pub use diff::{display_coords, FrameDiffer, PixelUpdate};
pub use fb::Frame;
pub use wire::{encode_batch, encode_batches, CommandBatch, ControlCommand};
