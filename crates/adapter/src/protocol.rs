//! Protocol module - JSON message types for the dispatch surface
//!
//! Line-delimited JSON. Every message has `type` and `seq`; server messages
//! also carry `ts` (timestamp in ms).

use serde::{Deserialize, Serialize};

// ============== Client -> Server Messages ==============

/// A dispatch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Launch the games unless they are already running
    Start {
        seq: u64,
        #[serde(default = "default_autoplay")]
        autoplay: bool,
    },
    /// Stop every running game
    Stop { seq: u64 },
    /// Stop the games, then send one control command by key
    Command { seq: u64, key: String },
}

fn default_autoplay() -> bool {
    true
}

impl Request {
    pub fn seq(&self) -> u64 {
        match self {
            Request::Start { seq, .. } | Request::Stop { seq } | Request::Command { seq, .. } => {
                *seq
            }
        }
    }
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    Started,
    AlreadyRunning,
    Stopped,
    NotRunning,
    Sent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The link manager could not reach the device
    LinkFailure,
    UnknownKey,
    InvalidMessage,
    /// Configured boards overlap or exceed the display
    InvalidLayout,
}

/// Acknowledgement of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Any server response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Ack(AckMessage),
    Error(ErrorMessage),
}

impl Response {
    pub fn seq(&self) -> u64 {
        match self {
            Response::Ack(a) => a.seq,
            Response::Error(e) => e.seq,
        }
    }
}

/// Parse one request line.
pub fn parse_request(json: &str) -> Result<Request, serde_json::Error> {
    serde_json::from_str(json)
}

/// Pull `"seq": <digits>` out of a line that failed to parse, so the error
/// response can still be correlated.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Create an ack message
pub fn create_ack(seq: u64, status: AckStatus) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
