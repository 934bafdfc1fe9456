//! Replay simulator for AD2 keypad clients.
//!
//! Loads a recorded protocol log once and serves it to every TCP client
//! at a fixed rate, each client with its own looping cursor. A single
//! process-wide pause flag freezes all cursors without skipping lines.
//! Inbound `!PING` heartbeats are answered so keypad clients stay happy.

pub mod error;
pub mod replay;
pub mod server;

pub use error::SimError;
pub use replay::{PauseFlag, ReplayCursor, ReplayLog};
pub use server::{DEFAULT_INTERVAL, DEFAULT_PORT, ReplayConfig, ReplayServer};
