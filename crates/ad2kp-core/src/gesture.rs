//! Tap-to-confirm gestures for sensitive alarm actions.
//!
//! Each [`AlarmAction`] has its own counter and its own reset deadline.
//! The third consecutive tap inside the window confirms; silence for the
//! whole window after a tap cancels the sequence.
//!
//! The confirmer is a plain owned value with no background tasks. The
//! owner drives the cancellation side by polling
//! [`GestureConfirmer::cancellation`] next to its input source:
//!
//! ```rust,ignore
//! loop {
//!     tokio::select! {
//!         Some(action) = taps.recv() => {
//!             if confirmer.register_tap(action) == Confirmation::Confirmed {
//!                 keypad.send(action.command()).await?;
//!             }
//!         }
//!         action = confirmer.cancellation() => tracing::info!(%action, "gesture cancelled"),
//!     }
//! }
//! ```

use std::collections::BTreeMap;

use tokio::time::{Duration, Instant};

use crate::command::AlarmAction;
use crate::config::GestureConfig;

/// Consecutive taps needed to confirm an action.
pub const TAPS_TO_CONFIRM: u8 = 3;

/// Outcome reported for a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Tap counted; `count` taps so far.
    Pending { count: u8 },
    /// Final tap landed; the counter is back at zero.
    Confirmed,
    /// The window elapsed without another tap; the counter is back at zero.
    Cancelled,
}

#[derive(Debug, Default)]
struct TapCounter {
    count: u8,
    deadline: Option<Instant>,
}

impl TapCounter {
    fn tap(&mut self, now: Instant, window: Duration) -> Confirmation {
        // A deadline nobody polled still counts as a reset.
        if self.deadline.is_some_and(|d| d <= now) {
            self.reset();
        }

        self.count += 1;
        if self.count >= TAPS_TO_CONFIRM {
            self.reset();
            return Confirmation::Confirmed;
        }

        self.deadline = Some(now + window);
        Confirmation::Pending { count: self.count }
    }

    fn reset(&mut self) {
        self.count = 0;
        self.deadline = None;
    }
}

/// Per-action tap counters with reset deadlines.
#[derive(Debug)]
pub struct GestureConfirmer {
    window: Duration,
    counters: BTreeMap<AlarmAction, TapCounter>,
}

impl GestureConfirmer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            window: config.reset_window,
            counters: BTreeMap::new(),
        }
    }

    /// Count one tap on `action` and restart its reset window.
    pub fn register_tap(&mut self, action: AlarmAction) -> Confirmation {
        let result = self
            .counters
            .entry(action)
            .or_default()
            .tap(Instant::now(), self.window);

        tracing::debug!(%action, ?result, "gesture tap");
        result
    }

    /// Current tap count for `action`.
    pub fn count(&self, action: AlarmAction) -> u8 {
        self.counters.get(&action).map_or(0, |c| c.count)
    }

    /// Resolves when the earliest pending sequence times out, resets that
    /// counter and returns its action (a [`Confirmation::Cancelled`] for
    /// it). Pending forever while no sequence is in progress.
    ///
    /// Cancel-safe: dropping the future before it resolves changes nothing.
    pub async fn cancellation(&mut self) -> AlarmAction {
        let next = self
            .counters
            .iter()
            .filter_map(|(action, counter)| counter.deadline.map(|d| (d, *action)))
            .min();

        let Some((deadline, action)) = next else {
            return std::future::pending().await;
        };

        tokio::time::sleep_until(deadline).await;

        if let Some(counter) = self.counters.get_mut(&action) {
            counter.reset();
        }
        tracing::debug!(%action, "gesture cancelled");
        action
    }
}

impl Default for GestureConfirmer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}
