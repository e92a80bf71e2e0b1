//! Double back-press to exit.
//!
//! At the navigation root a first back-press arms the guard; a second one
//! inside the window exits. Anywhere else back-presses navigate back.

use std::{ops::Sub, time::Duration};

use tracing::debug;

/// What a back-press does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// Navigate back in the surface history.
    NavigateBack,
    /// Guard armed; tell the user to press again.
    Armed,
    /// Terminate the app.
    Exit,
}

/// Exit confirmation state.
#[derive(Debug, Clone)]
pub struct ExitGuard<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    armed_at: Option<I>,
    window: Duration,
}

impl<I> ExitGuard<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Disarmed guard with the given confirmation window.
    pub fn new(window: Duration) -> Self {
        Self { armed_at: None, window }
    }

    /// Whether a second back-press at `now` would exit.
    #[must_use]
    pub fn is_armed(&self, now: I) -> bool {
        self.armed_at.is_some_and(|at| now - at < self.window)
    }

    /// Handle a back-press.
    pub fn back_pressed(&mut self, now: I, can_go_back: bool) -> BackOutcome {
        if can_go_back {
            return BackOutcome::NavigateBack;
        }

        if self.is_armed(now) {
            self.armed_at = None;
            debug!("exit confirmed");
            return BackOutcome::Exit;
        }

        self.armed_at = Some(now);
        debug!(window = ?self.window, "exit guard armed");
        BackOutcome::Armed
    }

    /// Disarm silently once the window has elapsed.
    ///
    /// Returns `true` if this call disarmed the guard.
    pub fn tick(&mut self, now: I) -> bool {
        match self.armed_at {
            Some(at) if now - at >= self.window => {
                self.armed_at = None;
                true
            },
            _ => false,
        }
    }
}
