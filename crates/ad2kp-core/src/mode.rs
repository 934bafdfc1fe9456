//! Display-mode derivation.
//!
//! [`derive_mode`] maps the latest snapshot to exactly one [`DisplayMode`]
//! by fixed precedence. Alarm conditions come first so a stale or partial
//! `ready` flag can never mask them:
//!
//! 1. no snapshot yet → `unknown`
//! 2. `alarm_sounding` → `alarming`
//! 3. `fire_alarm` → `fire`
//! 4. `ready` → `ready`
//! 5. `armed_away` → `armed_away` (`armed_away_exit` while `exit_now`)
//! 6. `armed_stay` → `armed_stay` (`armed_stay_exit` while `exit_now`)
//! 7. alpha message is `"Unknown"` → `unknown`
//! 8. otherwise → `not_ready`
//!
//! [`ModeTracker`] remembers the last surfaced mode and reports only edges.

use serde::{Deserialize, Serialize};

use ad2kp_api::DeviceState;

/// The single display state derived from a snapshot.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Unknown,
    Ready,
    NotReady,
    ArmedAway,
    ArmedAwayExit,
    ArmedStay,
    ArmedStayExit,
    ArmedNight,
    ArmedNightExit,
    Alarming,
    Fire,
}

/// Derive the display mode for a snapshot. Pure and total.
pub fn derive_mode(snapshot: Option<&DeviceState>) -> DisplayMode {
    let Some(state) = snapshot else {
        return DisplayMode::Unknown;
    };

    if state.alarm_sounding {
        DisplayMode::Alarming
    } else if state.fire_alarm {
        DisplayMode::Fire
    } else if state.ready {
        DisplayMode::Ready
    } else if state.armed_away {
        if state.exit_now {
            DisplayMode::ArmedAwayExit
        } else {
            DisplayMode::ArmedAway
        }
    } else if state.armed_stay {
        if state.exit_now {
            DisplayMode::ArmedStayExit
        } else {
            DisplayMode::ArmedStay
        }
    } else if state.is_unknown() {
        DisplayMode::Unknown
    } else {
        DisplayMode::NotReady
    }
}

// ── Edge detection ───────────────────────────────────────────────────

/// A change of surfaced mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeTransition {
    pub from: DisplayMode,
    pub to: DisplayMode,
}

/// Tracks the last surfaced mode. Starts at `unknown` without notifying.
#[derive(Debug, Clone, Default)]
pub struct ModeTracker {
    current: DisplayMode,
}

impl ModeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> DisplayMode {
        self.current
    }

    /// Re-derive from `snapshot`; returns the transition only when the
    /// derived mode differs from the last surfaced one.
    pub fn observe(&mut self, snapshot: Option<&DeviceState>) -> Option<ModeTransition> {
        let mode = derive_mode(snapshot);
        if mode == self.current {
            return None;
        }

        let transition = ModeTransition {
            from: self.current,
            to: mode,
        };
        self.current = mode;
        Some(transition)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
