//! Adapter module - dispatch surface over a TCP socket with a JSON protocol
//!
//! External automation (a home-automation hook, a script, `nc`) starts and
//! stops the games and sends immediate control commands through this module.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP. Each
//! request line gets exactly one response line.
//!
//! ## Client → Server
//!
//! - **start**: launch the games (`autoplay` defaults to true); a no-op while running
//! - **stop**: stop every game; a no-op when idle
//! - **command**: stop the games, then send one control command by key
//!   (`on`, `off`, `blue`, `cyan`, `green`, `red`, `purple`, `white`, `yellow`, `pink`)
//!
//! ## Server → Client
//!
//! - **ack**: `status` is one of `started`, `already_running`, `stopped`,
//!   `not_running`, `sent`
//! - **error**: `code` is one of `link_failure`, `unknown_key`,
//!   `invalid_message`, `invalid_layout`
//!
//! # Environment Variables
//!
//! - `CURTAIN_HOST`: Bind address (default: "127.0.0.1")
//! - `CURTAIN_PORT`: Port number (default: 8080)
//! - `CURTAIN_DISABLED`: Set to "1" or "true" to disable the server entirely
//! - `CURTAIN_FPS`: Game ticks per second (default: 3)
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"start","seq":1}
//! Server -> Client: {"type":"ack","seq":1,"ts":1234567890,"status":"started"}
//! Client -> Server: {"type":"command","seq":2,"key":"red"}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567891,"status":"sent"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 8080
//! {"type":"start","seq":1,"autoplay":true}
//! ```

pub mod controller;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use curtain_types as types;

pub use controller::{Controller, DispatchError, RunSettings, StartOutcome, StopOutcome};
pub use protocol::*;
pub use runtime::{run_game, TickSettings};
pub use server::{dispatch, handle_line, run_server, ServerConfig};
