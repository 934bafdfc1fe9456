// ── Panel attributes per display mode ──
//
// Exhaustive match over the closed DisplayMode enum: adding a mode fails
// to compile until it has attributes, so there is no fallback row.

use serde::Serialize;

use crate::command::KeypadCommand;
use crate::mode::DisplayMode;

/// Coarse status bucket used to color the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusClass {
    Ready,
    NotReady,
    Armed,
    Alarming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PanelIcon {
    HouseWithKey,
    HouseWithLock,
    HouseWithWalker,
}

/// One of the two action buttons under the status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelButton {
    pub icon: PanelIcon,
    #[serde(serialize_with = "serialize_command")]
    pub command: KeypadCommand,
}

impl PanelButton {
    const fn new(icon: PanelIcon, command: KeypadCommand) -> Self {
        Self { icon, command }
    }

    pub fn label(&self) -> &'static str {
        self.command.label()
    }
}

fn serialize_command<S: serde::Serializer>(cmd: &KeypadCommand, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(cmd.label())
}

/// Everything a renderer needs for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelAttributes {
    pub status: StatusClass,
    pub icon: PanelIcon,
    pub label: &'static str,
    pub primary: Option<PanelButton>,
    pub secondary: Option<PanelButton>,
}

const DISARM: PanelButton = PanelButton::new(PanelIcon::HouseWithLock, KeypadCommand::Disarm);
const EXIT: PanelButton = PanelButton::new(PanelIcon::HouseWithWalker, KeypadCommand::Exit);
const AWAY: PanelButton = PanelButton::new(PanelIcon::HouseWithKey, KeypadCommand::Away);
const STAY: PanelButton = PanelButton::new(PanelIcon::HouseWithKey, KeypadCommand::Stay);

const fn armed(icon: PanelIcon, label: &'static str, secondary: PanelButton) -> PanelAttributes {
    PanelAttributes {
        status: StatusClass::Armed,
        icon,
        label,
        primary: Some(DISARM),
        secondary: Some(secondary),
    }
}

const fn disarmed(status: StatusClass, label: &'static str) -> PanelAttributes {
    PanelAttributes {
        status,
        icon: PanelIcon::HouseWithLock,
        label,
        primary: Some(AWAY),
        secondary: Some(STAY),
    }
}

const fn alarming(label: &'static str) -> PanelAttributes {
    PanelAttributes {
        status: StatusClass::Alarming,
        icon: PanelIcon::HouseWithKey,
        label,
        primary: Some(DISARM),
        secondary: Some(DISARM),
    }
}

impl DisplayMode {
    /// Display attributes for this mode.
    pub const fn panel(self) -> PanelAttributes {
        match self {
            Self::Unknown => PanelAttributes {
                status: StatusClass::NotReady,
                icon: PanelIcon::HouseWithKey,
                label: "Unknown",
                primary: None,
                secondary: None,
            },
            Self::Ready => disarmed(StatusClass::Ready, "Ready"),
            Self::NotReady => disarmed(StatusClass::NotReady, "Not Ready"),
            Self::ArmedAway => armed(PanelIcon::HouseWithKey, "Armed (away)", EXIT),
            Self::ArmedStay => armed(PanelIcon::HouseWithKey, "Armed (stay)", EXIT),
            Self::ArmedNight => armed(PanelIcon::HouseWithKey, "Armed (night)", EXIT),
            Self::ArmedAwayExit | Self::ArmedStayExit | Self::ArmedNightExit => {
                armed(PanelIcon::HouseWithWalker, "Armed (exit now)", DISARM)
            }
            Self::Alarming => alarming("Alarming!"),
            Self::Fire => alarming("Fire!"),
        }
    }
}
