// ── Device-state snapshot ──
//
// One complete partition state as pushed by the device. Each snapshot
// replaces the previous one wholesale; there is no merging.

use serde::{Deserialize, Serialize};

/// A full device-state snapshot decoded from a `{...}` line.
///
/// Unknown keys are kept in `extra` so nothing the device sends is
/// silently dropped. Missing flags default to `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct DeviceState {
    /// Partition has no faulted zones and can be armed.
    #[serde(default)]
    pub ready: bool,

    #[serde(default)]
    pub armed_away: bool,

    /// Armed stay. Some panels report this as `armed_home`.
    #[serde(default, alias = "armed_home")]
    pub armed_stay: bool,

    #[serde(default)]
    pub alarm_sounding: bool,

    #[serde(default)]
    pub fire_alarm: bool,

    /// Exit delay is running after arming.
    #[serde(default)]
    pub exit_now: bool,

    /// Last text shown on the alpha keypad display. The device reports
    /// `"Unknown"` until it has seen real panel traffic.
    #[serde(default)]
    pub last_alpha_message: String,

    #[serde(default)]
    pub chime_on: bool,

    #[serde(default)]
    pub ac_power: bool,

    #[serde(default)]
    pub battery_low: bool,

    #[serde(default)]
    pub zone_bypassed: bool,

    #[serde(default)]
    pub entry_delay_off: bool,

    #[serde(default)]
    pub perimeter_only: bool,

    #[serde(default)]
    pub programming: bool,

    #[serde(default)]
    pub system_issue: bool,

    /// Event tag attached by the sender, e.g. `"SYNC"` for a reply to a
    /// synchronization request.
    #[serde(default)]
    pub event: Option<String>,

    /// All remaining fields the device sends.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeviceState {
    /// Alpha message text the device uses before it knows the panel state.
    pub const UNKNOWN_ALPHA_MESSAGE: &'static str = "Unknown";

    /// Returns `true` while the device has not yet decoded any panel state.
    pub fn is_unknown(&self) -> bool {
        self.last_alpha_message == Self::UNKNOWN_ALPHA_MESSAGE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_flags_default_to_false() {
        let state: DeviceState = serde_json::from_str("{}").unwrap();
        assert!(!state.ready);
        assert!(!state.alarm_sounding);
        assert!(state.last_alpha_message.is_empty());
        assert!(state.extra.is_empty());
    }

    #[test]
    fn armed_home_is_accepted_as_armed_stay() {
        let state: DeviceState = serde_json::from_str(r#"{"armed_home": true}"#).unwrap();
        assert!(state.armed_stay);
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let json = r#"{
            "ready": true,
            "last_alpha_message": "****DISARMED****  Ready to Arm  ",
            "event": "SYNC",
            "zone_alerts": [],
            "partition": 1
        }"#;

        let state: DeviceState = serde_json::from_str(json).unwrap();
        assert!(state.ready);
        assert_eq!(state.event.as_deref(), Some("SYNC"));
        assert_eq!(state.extra["partition"], 1);
        assert!(state.extra["zone_alerts"].is_array());
        assert!(!state.is_unknown());
    }

    #[test]
    fn unknown_sentinel_is_detected() {
        let state = DeviceState {
            last_alpha_message: "Unknown".into(),
            ..DeviceState::default()
        };
        assert!(state.is_unknown());
    }
}
