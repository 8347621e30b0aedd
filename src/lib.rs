//! LED curtain autoplay (workspace facade crate).
//!
//! Re-exports the member crates under stable names so the binary and the
//! integration tests use `led_curtain::{core, engine, frame, link, adapter, types}`.

pub use curtain_adapter as adapter;
pub use curtain_core as core;
pub use curtain_engine as engine;
pub use curtain_frame as frame;
pub use curtain_link as link;
pub use curtain_types as types;
