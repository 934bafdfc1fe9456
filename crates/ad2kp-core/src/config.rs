// ── Runtime keypad configuration ──
//
// These types describe which endpoint to reach, which partition to
// track and how the session is timed. They never touch disk; the CLI
// builds them (usually through ad2kp-config) and hands them in.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ad2kp_api::PING_MASK;

/// Transport used to reach the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TransportKind {
    /// The device web server's `/ad2ws` socket.
    #[default]
    Websocket,
    /// Raw newline-delimited TCP (ser2sock, replay simulator).
    Tcp,
}

/// Where the keypad connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub transport: TransportKind,
    pub host: String,
    /// Required for TCP; optional for WebSocket (defaults to port 80).
    pub port: Option<u16>,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.transport, self.port) {
            (TransportKind::Websocket, Some(port)) => write!(f, "ws://{}:{port}/ad2ws", self.host),
            (TransportKind::Websocket, None) => write!(f, "ws://{}/ad2ws", self.host),
            (TransportKind::Tcp, Some(port)) => write!(f, "tcp://{}:{port}", self.host),
            (TransportKind::Tcp, None) => write!(f, "tcp://{}", self.host),
        }
    }
}

/// Session settings for a [`Keypad`](crate::Keypad).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadConfig {
    /// Virtual partition id sent in `!SYNC`.
    pub partition: u32,
    /// Code slot id sent in `!SYNC`.
    pub code: u32,
    /// Mask sent with each `!PING`.
    pub ping_mask: String,
    /// Interval between heartbeats while connected.
    pub heartbeat_interval: Duration,
    /// Fixed delay before every reconnect attempt.
    pub reconnect_delay: Duration,
}

impl Default for KeypadConfig {
    fn default() -> Self {
        Self {
            partition: 0,
            code: 0,
            ping_mask: PING_MASK.to_owned(),
            heartbeat_interval: Duration::from_secs(15),
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

/// Settings for a [`GestureConfirmer`](crate::GestureConfirmer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureConfig {
    /// Silence after the last tap that cancels a pending sequence.
    pub reset_window: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            reset_window: Duration::from_secs(3),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device_timing() {
        let cfg = KeypadConfig::default();
        assert_eq!(cfg.heartbeat_interval, Duration::from_secs(15));
        assert_eq!(cfg.reconnect_delay, Duration::from_secs(1));
        assert_eq!(cfg.ping_mask, "00000000");
        assert_eq!(GestureConfig::default().reset_window, Duration::from_secs(3));
    }

    #[test]
    fn endpoint_display() {
        let ws = Endpoint {
            transport: TransportKind::Websocket,
            host: "10.0.0.5".into(),
            port: None,
        };
        assert_eq!(ws.to_string(), "ws://10.0.0.5/ad2ws");

        let tcp = Endpoint {
            transport: TransportKind::Tcp,
            host: "localhost".into(),
            port: Some(10000),
        };
        assert_eq!(tcp.to_string(), "tcp://localhost:10000");
    }

    #[test]
    fn transport_kind_parses_case_insensitively() {
        assert_eq!("TCP".parse::<TransportKind>().unwrap(), TransportKind::Tcp);
        assert_eq!("websocket".parse::<TransportKind>().unwrap(), TransportKind::Websocket);
        assert!("serial".parse::<TransportKind>().is_err());
    }
}
