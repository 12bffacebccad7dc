// src/command/attestation/notify.rs

//! "Document downloaded" notification timeline.
//!
//! Revealed at start. The show (100 ms) and hide (6000 ms) steps both count
//! from the start instant; removal from the accessible tree follows 500 ms
//! after hiding. Starting again while a timeline is running cancels the old
//! one.

use std::time::{Duration, Instant};

pub const SHOW_DELAY: Duration = Duration::from_millis(100);
pub const HIDE_DELAY: Duration = Duration::from_millis(6000);
pub const REMOVE_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationPhase {
    /// Not in the accessible tree.
    Hidden,
    /// In the tree, not yet in the "shown" visual state.
    Revealed,
    Shown,
    /// Fading out, still in the tree.
    Hiding,
}

#[derive(Clone, Debug)]
pub struct Notification {
    phase: NotificationPhase,
    started: Option<Instant>,
}

impl Default for Notification {
    fn default() -> Self {
        Self {
            phase: NotificationPhase::Hidden,
            started: None,
        }
    }
}

impl Notification {
    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
        self.phase = NotificationPhase::Revealed;
    }

    /// Advance to the phase due at `now`.
    pub fn tick(&mut self, now: Instant) -> NotificationPhase {
        let Some(start) = self.started else {
            return self.phase;
        };

        let elapsed = now.saturating_duration_since(start);
        self.phase = if elapsed < SHOW_DELAY {
            NotificationPhase::Revealed
        } else if elapsed < HIDE_DELAY {
            NotificationPhase::Shown
        } else if elapsed < HIDE_DELAY + REMOVE_DELAY {
            NotificationPhase::Hiding
        } else {
            self.started = None;
            NotificationPhase::Hidden
        };
        self.phase
    }

    pub fn phase(&self) -> NotificationPhase {
        self.phase
    }

    pub fn is_shown(&self) -> bool {
        self.phase == NotificationPhase::Shown
    }

    pub fn in_accessible_tree(&self) -> bool {
        self.phase != NotificationPhase::Hidden
    }

    /// When the next phase change is due, for hosts that schedule repaints.
    pub fn next_deadline(&self) -> Option<Instant> {
        let start = self.started?;
        match self.phase {
            NotificationPhase::Hidden => None,
            NotificationPhase::Revealed => Some(start + SHOW_DELAY),
            NotificationPhase::Shown => Some(start + HIDE_DELAY),
            NotificationPhase::Hiding => Some(start + HIDE_DELAY + REMOVE_DELAY),
        }
    }
}

// ======================================================
// Unit Tests
// ======================================================
