//! Client-side state machinery for the AD2 virtual keypad.
//!
//! - **[`Keypad`]** -- owns one logical connection to the device: opens the
//!   transport, sends the `!SYNC` request, heartbeats while connected,
//!   feeds inbound snapshots to the mode engine and reconnects after a
//!   fixed delay whenever the transport goes away. Consumers observe it
//!   through `watch` receivers (current state) and a `broadcast` channel
//!   of [`KeypadEvent`]s (edges).
//!
//! - **[`derive_mode`] / [`ModeTracker`]** -- pure precedence rule from a
//!   [`DeviceState`](ad2kp_api::DeviceState) snapshot to one
//!   [`DisplayMode`], plus edge detection so repeated identical snapshots
//!   never re-notify.
//!
//! - **[`PanelAttributes`]** -- exhaustive per-mode display table
//!   (status, icon, label, the two action buttons).
//!
//! - **[`GestureConfirmer`]** -- three taps inside a rolling window confirm
//!   a sensitive [`AlarmAction`]; silence cancels.

pub mod command;
pub mod config;
pub mod error;
pub mod gesture;
pub mod keypad;
pub mod mode;
pub mod panel;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{AlarmAction, KeypadCommand};
pub use config::{Endpoint, GestureConfig, KeypadConfig, TransportKind};
pub use error::CoreError;
pub use gesture::{Confirmation, GestureConfirmer, TAPS_TO_CONFIRM};
pub use keypad::{ConnectionState, Keypad, KeypadEvent};
pub use mode::{DisplayMode, ModeTracker, ModeTransition, derive_mode};
pub use panel::{PanelAttributes, PanelButton, PanelIcon, StatusClass};
