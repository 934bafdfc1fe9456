//! Line protocol codec.
//!
//! Every message is one line of text. Lines starting with `{` carry a full
//! [`DeviceState`] as JSON; lines starting with `!` are control lines of the
//! form `!<NAME>:<payload>`:
//!
//! | Direction | Line | Meaning |
//! |---|---|---|
//! | client → device | `!SYNC:<partition>,<code>` | subscribe to a partition |
//! | client → device | `!PING:<mask>` | heartbeat probe |
//! | client → device | `!SEND:<command>` | forward a keypad command |
//! | device → client | `{...}` | state snapshot |
//! | device → client | `!PONG:<mask>` | heartbeat reply |
//!
//! The codec is stateless: [`parse_line`] classifies and decodes one line,
//! and [`ControlLine`]'s `Display` impl frames outbound control lines.

use std::fmt;

use crate::error::ProtocolError;
use crate::model::DeviceState;

/// Heartbeat mask sent with `!PING:` and echoed in `!PONG:`.
pub const PING_MASK: &str = "00000000";

// ── ControlVerb ──────────────────────────────────────────────────────

/// Name part of a `!<NAME>:<payload>` control line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlVerb {
    Sync,
    Ping,
    Pong,
    Send,
    /// Any verb this side does not act on. Accepted and logged only.
    Other(String),
}

impl ControlVerb {
    fn from_name(name: &str) -> Self {
        match name {
            "SYNC" => Self::Sync,
            "PING" => Self::Ping,
            "PONG" => Self::Pong,
            "SEND" => Self::Send,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Sync => "SYNC",
            Self::Ping => "PING",
            Self::Pong => "PONG",
            Self::Send => "SEND",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ControlVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ControlLine ──────────────────────────────────────────────────────

/// A `!`-prefixed control line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlLine {
    pub verb: ControlVerb,
    pub payload: String,
}

impl ControlLine {
    /// Synchronization request addressing a partition with a code slot.
    pub fn sync(partition: u32, code: u32) -> Self {
        Self {
            verb: ControlVerb::Sync,
            payload: format!("{partition},{code}"),
        }
    }

    pub fn ping(mask: &str) -> Self {
        Self {
            verb: ControlVerb::Ping,
            payload: mask.to_owned(),
        }
    }

    pub fn pong(mask: &str) -> Self {
        Self {
            verb: ControlVerb::Pong,
            payload: mask.to_owned(),
        }
    }

    /// Forward an opaque command token. The token is not validated here.
    pub fn send(command: &str) -> Self {
        Self {
            verb: ControlVerb::Send,
            payload: command.to_owned(),
        }
    }

    /// Partition and code slot of a `!SYNC:` line, if the payload parses.
    pub fn sync_target(&self) -> Option<(u32, u32)> {
        if self.verb != ControlVerb::Sync {
            return None;
        }
        let (partition, code) = self.payload.split_once(',')?;
        Some((partition.trim().parse().ok()?, code.trim().parse().ok()?))
    }
}

impl fmt::Display for ControlLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}:{}", self.verb, self.payload)
    }
}

// ── Message ──────────────────────────────────────────────────────────

/// One decoded inbound line.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    State(DeviceState),
    Control(ControlLine),
}

/// Classify and decode a single line.
///
/// Trailing CR/LF is ignored. Returns `Ok(None)` for an empty line, which
/// carries no event. Decode faults come back as [`ProtocolError`]; the
/// caller logs and drops the line.
pub fn parse_line(line: &str) -> Result<Option<Message>, ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);

    match line.as_bytes().first() {
        None => Ok(None),
        Some(b'{') => serde_json::from_str::<DeviceState>(line)
            .map(|state| Some(Message::State(state)))
            .map_err(|e| ProtocolError::MalformedSnapshot {
                message: e.to_string(),
                line: line.to_owned(),
            }),
        Some(b'!') => {
            let body = line.strip_prefix('!').unwrap_or(line);
            let (name, payload) = body.split_once(':').unwrap_or((body, ""));
            Ok(Some(Message::Control(ControlLine {
                verb: ControlVerb::from_name(name),
                payload: payload.to_owned(),
            })))
        }
        Some(_) => Err(ProtocolError::Unrecognized(line.to_owned())),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
