// ── Replay source, cursor and pause flag ──
//
// The log is read once and shared read-only between sessions. Each
// session owns a cursor; the pause flag is the only shared mutable state.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::SimError;

/// Recorded protocol lines, immutable after load.
#[derive(Debug, Clone)]
pub struct ReplayLog {
    lines: Arc<[String]>,
}

impl ReplayLog {
    /// Read `path` into memory. Missing, unreadable or blank-only files are
    /// refused.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. The file is split on
    /// every `\n`, so a trailing newline yields a final blank line that
    /// takes one tick before the replay wraps.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let bytes = std::fs::read(path).map_err(|source| SimError::LogUnreadable {
            path: path.to_owned(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);

        Self::from_lines(text.split('\n')).ok_or_else(|| SimError::EmptyLog {
            path: path.to_owned(),
        })
    }

    /// Build from in-memory lines. Blank lines are kept so they still take
    /// up a tick. Returns `None` when no line has content.
    pub fn from_lines<I, S>(lines: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Arc<[String]> = lines
            .into_iter()
            .map(|l| l.as_ref().trim_end_matches(['\r', '\n']).to_owned())
            .collect();

        if lines.iter().all(String::is_empty) {
            return None;
        }
        Some(Self { lines })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Per-session position in a [`ReplayLog`].
#[derive(Debug, Default)]
pub struct ReplayCursor {
    position: usize,
}

impl ReplayCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Consume one tick: advance (wrapping at the end) and return the line
    /// to send, or `None` for a blank line.
    pub fn advance<'a>(&mut self, log: &'a ReplayLog) -> Option<&'a str> {
        let line = log.lines.get(self.position).map(String::as_str);
        self.position = (self.position + 1) % log.len().max(1);
        line.filter(|l| !l.is_empty())
    }
}

/// Process-wide pause switch shared by every session.
#[derive(Debug, Clone, Default)]
pub struct PauseFlag(Arc<AtomicBool>);

impl PauseFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, paused: bool) {
        self.0.store(paused, Ordering::Relaxed);
    }

    /// Flip the flag; returns the new state.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::Relaxed)
    }
}
