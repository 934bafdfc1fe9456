// ── Keypad command vocabulary ──
//
// Tokens the device accepts after `!SEND:`. The session layer forwards
// command strings verbatim; this enum only exists so callers do not have
// to spell the bracketed tokens by hand.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A command the device understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypadCommand {
    Disarm,
    Stay,
    Away,
    Exit,
    Chime,
    /// Bypass one zone.
    Bypass(u8),
    PanicAlarm,
    FireAlarm,
    AuxAlarm,
}

impl KeypadCommand {
    /// Short button label, e.g. `DISARM`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Disarm => "DISARM",
            Self::Stay => "STAY",
            Self::Away => "AWAY",
            Self::Exit => "EXIT",
            Self::Chime => "CHIME",
            Self::Bypass(_) => "BYPASS",
            Self::PanicAlarm => "PANIC_ALARM",
            Self::FireAlarm => "FIRE_ALARM",
            Self::AuxAlarm => "AUX_ALARM",
        }
    }

    /// Wire token, e.g. `<DISARM>` or `<BYPASS>07`.
    pub fn token(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeypadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bypass(zone) => write!(f, "<BYPASS>{zone:02}"),
            other => write!(f, "<{}>", other.label()),
        }
    }
}

impl FromStr for KeypadCommand {
    type Err = CoreError;

    /// Accepts plain names (`disarm`, `panic`, `bypass:7`) as well as wire
    /// tokens (`<DISARM>`, `<BYPASS>07`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let invalid = |reason: &str| CoreError::InvalidCommand {
            input: s.to_owned(),
            reason: reason.to_owned(),
        };

        let (name, arg) = if let Some(rest) = upper.strip_prefix('<') {
            rest.split_once('>')
                .ok_or_else(|| invalid("unterminated token"))?
        } else {
            upper.split_once(':').unwrap_or((upper.as_str(), ""))
        };

        let command = match name {
            "DISARM" => Self::Disarm,
            "STAY" => Self::Stay,
            "AWAY" => Self::Away,
            "EXIT" => Self::Exit,
            "CHIME" => Self::Chime,
            "PANIC" | "PANIC_ALARM" => Self::PanicAlarm,
            "FIRE" | "FIRE_ALARM" => Self::FireAlarm,
            "AUX" | "AUX_ALARM" => Self::AuxAlarm,
            "BYPASS" => {
                let zone = arg
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| invalid("bypass needs a zone number, e.g. bypass:7"))?;
                return Ok(Self::Bypass(zone));
            }
            _ => return Err(invalid("unknown command")),
        };

        if arg.is_empty() {
            Ok(command)
        } else {
            Err(invalid("unexpected argument"))
        }
    }
}

/// Sensitive actions that need a confirmation gesture before sending.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlarmAction {
    Panic,
    Fire,
    Aux,
}

impl AlarmAction {
    /// Command sent once the gesture is confirmed.
    pub fn command(self) -> KeypadCommand {
        match self {
            Self::Panic => KeypadCommand::PanicAlarm,
            Self::Fire => KeypadCommand::FireAlarm,
            Self::Aux => KeypadCommand::AuxAlarm,
        }
    }
}
