//! Presentation overlay controller.
//!
//! Two independent indicators: a progress bar tied to every navigation, and a
//! splash overlay that exists only at boot and leaves exactly once.

use std::time::Duration;

use tracing::debug;

/// Splash overlay lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplashState {
    /// No splash configured.
    Absent,
    /// Covering the content.
    Visible,
    /// Fade-out animation running.
    Fading,
    /// Gone for the rest of the session.
    Hidden,
}

/// Effects requested by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    /// Show the progress indicator.
    ShowProgress,
    /// Hide the progress indicator.
    HideProgress,
    /// Start the splash fade-out animation.
    FadeOutSplash {
        /// Animation length.
        duration: Duration,
    },
}

/// Progress and splash visibility.
#[derive(Debug, Clone)]
pub struct OverlayController {
    progress_visible: bool,
    splash: SplashState,
    fade: Duration,
    dismissals: u32,
}

impl OverlayController {
    /// Controller for a session with or without a splash.
    pub fn new(has_splash: bool, fade: Duration) -> Self {
        Self {
            progress_visible: false,
            splash: if has_splash { SplashState::Visible } else { SplashState::Absent },
            fade,
            dismissals: 0,
        }
    }

    /// Splash state.
    #[must_use]
    pub fn splash(&self) -> SplashState {
        self.splash
    }

    /// Whether the progress indicator is shown.
    #[must_use]
    pub fn progress_visible(&self) -> bool {
        self.progress_visible
    }

    /// Number of splash fade-outs started this session.
    #[must_use]
    pub fn dismissals(&self) -> u32 {
        self.dismissals
    }

    /// A navigation started.
    pub fn navigation_started(&mut self) -> Option<OverlayAction> {
        if self.progress_visible {
            return None;
        }
        self.progress_visible = true;
        Some(OverlayAction::ShowProgress)
    }

    /// Content (remote or fallback) is ready.
    pub fn content_ready(&mut self) -> Vec<OverlayAction> {
        let mut actions = Vec::with_capacity(2);
        if self.progress_visible {
            self.progress_visible = false;
            actions.push(OverlayAction::HideProgress);
        }
        actions.extend(self.dismiss_splash());
        actions
    }

    /// Navigation ended without content (failure or teardown).
    pub fn navigation_stopped(&mut self) -> Option<OverlayAction> {
        if !self.progress_visible {
            return None;
        }
        self.progress_visible = false;
        Some(OverlayAction::HideProgress)
    }

    /// Start the splash fade if it is still up. No-op otherwise.
    pub fn dismiss_splash(&mut self) -> Option<OverlayAction> {
        if self.splash != SplashState::Visible {
            return None;
        }
        self.splash = SplashState::Fading;
        self.dismissals += 1;
        debug!(fade = ?self.fade, "dismissing splash");
        Some(OverlayAction::FadeOutSplash { duration: self.fade })
    }

    /// The fade animation finished.
    pub fn fade_finished(&mut self) {
        if self.splash == SplashState::Fading {
            self.splash = SplashState::Hidden;
        }
    }
}
