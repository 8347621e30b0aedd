//! Wire format for the curtain controller.
//!
//! Every command is wrapped in a `0x7E 0x07 <opcode> ... 0xEF` envelope.
//!
//! ```text
//! pixel batch   7E 07 64 | (row col R G B) x 10 | EF      54 bytes
//! power         7E 07 04 | on/off payload (5)   | EF       9 bytes
//! solid color   7E 07 05 | 03 R G B 10          | EF       9 bytes
//! ```
//!
//! Unused batch entries are filled with `FF FF FF FF FF`.

use arrayvec::ArrayVec;

use crate::diff::PixelUpdate;
use crate::types::Rgb;

/// Envelope start bytes
pub const ENVELOPE_START: [u8; 2] = [0x7E, 0x07];

/// Envelope terminator
pub const TRAILER: u8 = 0xEF;

/// Opcode of a per-pixel batch
pub const OP_PIXELS: u8 = 0x64;

/// Opcode of a power on/off command
pub const OP_POWER: u8 = 0x04;

/// Opcode of a solid color command
pub const OP_SOLID: u8 = 0x05;

/// Pixel batch header
pub const BATCH_HEADER: [u8; 3] = [ENVELOPE_START[0], ENVELOPE_START[1], OP_PIXELS];

/// Pixels carried by one batch
pub const BATCH_PIXELS: usize = 10;

/// Bytes per batch entry: row, col, R, G, B
pub const ENTRY_LEN: usize = 5;

/// Filler for unused batch entries
pub const PADDING_ENTRY: [u8; ENTRY_LEN] = [0xFF; ENTRY_LEN];

/// Encoded length of every pixel batch
pub const BATCH_LEN: usize = BATCH_HEADER.len() + BATCH_PIXELS * ENTRY_LEN + 1;

/// One encoded pixel batch
pub type CommandBatch = [u8; BATCH_LEN];

/// Encoded length of control commands
pub const CONTROL_LEN: usize = 9;

/// One encoded control command
pub type ControlFrame = [u8; CONTROL_LEN];

/// Encode up to [`BATCH_PIXELS`] pixels into one padded batch.
///
/// Pixels beyond the first ten are ignored; use [`encode_batches`] for longer
/// lists.
pub fn encode_batch(pixels: &[PixelUpdate]) -> CommandBatch {
    let mut out = [0u8; BATCH_LEN];
    out[..BATCH_HEADER.len()].copy_from_slice(&BATCH_HEADER);

    let mut entries: ArrayVec<[u8; ENTRY_LEN], BATCH_PIXELS> = ArrayVec::new();
    for p in pixels.iter().take(BATCH_PIXELS) {
        let [r, g, b] = p.color.to_bytes();
        entries.push([p.row, p.col, r, g, b]);
    }
    while !entries.is_full() {
        entries.push(PADDING_ENTRY);
    }

    for (i, entry) in entries.iter().enumerate() {
        let start = BATCH_HEADER.len() + i * ENTRY_LEN;
        out[start..start + ENTRY_LEN].copy_from_slice(entry);
    }
    out[BATCH_LEN - 1] = TRAILER;
    out
}

/// Chunk `pixels` into batches of ten. An empty list yields no batches.
pub fn encode_batches(pixels: &[PixelUpdate]) -> Vec<CommandBatch> {
    pixels.chunks(BATCH_PIXELS).map(encode_batch).collect()
}

/// Control commands sent outside of per-pixel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    PowerOn,
    PowerOff,
    Solid(Rgb),
}

/// Lookup table for immediate commands, keyed by the name used on the
/// dispatch surface.
pub const CONTROL_KEYS: [(&str, ControlCommand); 10] = [
    ("on", ControlCommand::PowerOn),
    ("off", ControlCommand::PowerOff),
    ("blue", ControlCommand::Solid(Rgb::new(0x00, 0x00, 0xFF))),
    ("cyan", ControlCommand::Solid(Rgb::new(0x00, 0xFF, 0xFF))),
    ("green", ControlCommand::Solid(Rgb::new(0x00, 0xFF, 0x00))),
    ("red", ControlCommand::Solid(Rgb::new(0xFF, 0x00, 0x00))),
    ("purple", ControlCommand::Solid(Rgb::new(0xFF, 0x00, 0xFF))),
    ("white", ControlCommand::Solid(Rgb::new(0xFF, 0xFF, 0xFF))),
    ("yellow", ControlCommand::Solid(Rgb::new(0xFF, 0xFF, 0x00))),
    ("pink", ControlCommand::Solid(Rgb::new(0xFF, 0x00, 0x80))),
];

impl ControlCommand {
    /// Look up a command by key (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use curtain_frame::wire::ControlCommand;
    ///
    /// assert_eq!(ControlCommand::from_key("ON"), Some(ControlCommand::PowerOn));
    /// assert_eq!(ControlCommand::from_key("sparkle"), None);
    /// ```
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        CONTROL_KEYS
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|&(_, cmd)| cmd)
    }

    pub fn encode(&self) -> ControlFrame {
        let [s0, s1] = ENVELOPE_START;
        match *self {
            ControlCommand::PowerOn => [s0, s1, OP_POWER, 0xFF, 0x00, 0x01, 0x02, 0x01, TRAILER],
            ControlCommand::PowerOff => [s0, s1, OP_POWER, 0x00, 0x00, 0x00, 0x02, 0x01, TRAILER],
            ControlCommand::Solid(c) => [s0, s1, OP_SOLID, 0x03, c.r, c.g, c.b, 0x10, TRAILER],
        }
    }
}

/// Per-LED mode: first init command
pub const INIT_MODE: ControlFrame = [0x7E, 0x07, 0x51, 0x00, 0xFF, 0xFF, 0xFF, 0x00, TRAILER];

/// Per-LED mode: second init command
pub const INIT_MASK: ControlFrame = [0x7E, 0x07, 0x58, 0x00, 0x00, 0xFF, 0xFF, 0x00, TRAILER];

/// Length of the third init command
pub const INIT_SEED_LEN: usize = 79;

const fn init_seed() -> [u8; INIT_SEED_LEN] {
    let mut out = [0xFF; INIT_SEED_LEN];
    out[0] = 0x7E;
    out[1] = 0x07;
    out[2] = OP_PIXELS;
    out[3] = 0x01;
    out[4] = 0x01;
    out[5] = 0xE0;
    out[6] = 0x00;
    out[7] = 0x00;
    out[INIT_SEED_LEN - 1] = TRAILER;
    out
}

/// Per-LED mode: third init command, a single-pixel write followed by fill
pub const INIT_SEED: [u8; INIT_SEED_LEN] = init_seed();

/// Commands that switch the controller into per-pixel mode, in send order.
pub fn init_sequence() -> [&'static [u8]; 3] {
    [&INIT_MODE[..], &INIT_MASK[..], &INIT_SEED[..]]
}
