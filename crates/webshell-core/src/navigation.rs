//! Navigation state machine.
//!
//! Decides whether the remote application or the bundled fallback document is
//! shown, and tracks the last remote location so the shell can return to it.
//!
//! # State Machine
//!
//! ```text
//!                 online ┌───────────────┐  finished   ┌──────────────┐
//!           ┌───────────>│ LoadingRemote │────────────>│ ContentReady │
//!           │            └───────────────┘             └──────────────┘
//! ┌─────────┐                ↑        │ lost / offline failure │ lost
//! │ Booting │          back  │        ↓                        ↓
//! └─────────┘  online  ┌─────────────────┐  finished  ┌───────────────┐
//!           └─────────>│ LoadingFallback │───────────>│ FallbackReady │
//!            offline   └─────────────────┘            └───────────────┘
//! ```
//!
//! # Invariants
//!
//! - `ContentReady` is never entered while connectivity is lost
//! - The last-known location is never the fallback document and starts at
//!   the configured remote URL on every boot
//! - Regaining connectivity only navigates when the fallback document is what
//!   the user is looking at

use tracing::{debug, info, warn};

use crate::{Notice, ShellConfig, config::is_under_root};

/// Navigation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    /// Not booted yet.
    Booting,
    /// Remote content requested, not yet rendered.
    LoadingRemote,
    /// Remote content rendered.
    ContentReady,
    /// Fallback document requested, not yet rendered.
    LoadingFallback,
    /// Fallback document rendered.
    FallbackReady,
}

impl NavigationState {
    /// Whether the state belongs to the fallback side.
    #[must_use]
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::LoadingFallback | Self::FallbackReady)
    }
}

/// Effects requested by the navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    /// Load this URL in the rendering surface.
    Load(String),
    /// Reload the current document.
    Reload,
    /// Show a transient notice.
    Notice(Notice),
}

/// Verdict of the pre-flight navigation guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// Let the surface navigate.
    Allow,
    /// Cancel the navigation and show the notice.
    Deny(Notice),
}

impl Interception {
    /// Whether the navigation is cancelled.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }
}

/// Navigation state machine.
#[derive(Debug, Clone)]
pub struct Navigator {
    state: NavigationState,
    remote_url: String,
    fallback_url: String,
    local_root: String,
    last_known: String,
    /// Most recent navigation the surface reported starting.
    displayed: Option<String>,
    /// Whether `displayed` has finished rendering.
    displayed_finished: bool,
    /// Load we asked for that the surface has not started yet.
    requested: Option<String>,
    online: bool,
}

impl Navigator {
    /// Create a navigator in `Booting`.
    pub fn new(
        remote_url: impl Into<String>,
        fallback_url: impl Into<String>,
        local_root: impl Into<String>,
    ) -> Self {
        let remote_url = remote_url.into();
        Self {
            state: NavigationState::Booting,
            last_known: remote_url.clone(),
            remote_url,
            fallback_url: fallback_url.into(),
            local_root: local_root.into(),
            displayed: None,
            displayed_finished: false,
            requested: None,
            online: false,
        }
    }

    /// Create a navigator from the shell configuration.
    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(&config.remote_url, config.fallback_url(), config.platform.local_root())
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// Location restored when connectivity returns.
    #[must_use]
    pub fn last_known(&self) -> &str {
        &self.last_known
    }

    /// Document the surface most recently started showing.
    #[must_use]
    pub fn displayed(&self) -> Option<&str> {
        self.displayed.as_deref()
    }

    /// Connectivity as last reported.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Configured fallback document.
    #[must_use]
    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    /// Whether `url` is served from the local asset bundle.
    #[must_use]
    pub fn is_local(&self, url: &str) -> bool {
        is_under_root(&self.local_root, url)
    }

    /// Pick the first document.
    ///
    /// `reachable` is the result of a non-blocking probe. No connectivity
    /// means the fallback, never a wait.
    pub fn boot(&mut self, reachable: bool) -> Vec<NavigationAction> {
        if self.state != NavigationState::Booting {
            warn!(state = ?self.state, "ignoring repeated boot");
            return Vec::new();
        }

        self.online = reachable;
        self.last_known = self.remote_url.clone();

        if reachable {
            info!(url = %self.remote_url, "booting online");
            self.transition(NavigationState::LoadingRemote);
            vec![self.load(self.remote_url.clone())]
        } else {
            info!("booting offline");
            self.transition(NavigationState::LoadingFallback);
            vec![self.load(self.fallback_url.clone()), NavigationAction::Notice(Notice::NoInternet)]
        }
    }

    /// Connectivity came back.
    pub fn on_connectivity_available(&mut self) -> Vec<NavigationAction> {
        self.online = true;
        if self.state == NavigationState::Booting {
            return Vec::new();
        }

        let notice = NavigationAction::Notice(Notice::BackOnline);
        if !self.state.is_fallback() {
            return vec![notice];
        }

        if self.showing_fallback() {
            let target = self.last_known.clone();
            debug!(url = %target, "restoring last known location");
            self.transition(NavigationState::LoadingRemote);
            return vec![self.load(target), notice];
        }

        // Another bundled page the user opened while offline stays put.
        if self.on_screen().is_some_and(|url| self.is_local(url)) {
            return vec![notice];
        }

        // The user moved on to a remote page while offline; leave it there.
        let next = if self.displayed_finished {
            NavigationState::ContentReady
        } else {
            NavigationState::LoadingRemote
        };
        self.transition(next);
        vec![notice]
    }

    /// Connectivity went away.
    pub fn on_connectivity_lost(&mut self) -> Vec<NavigationAction> {
        self.online = false;
        if self.state == NavigationState::Booting {
            return Vec::new();
        }

        if let Some(current) = self.displayed.as_deref() {
            if !self.is_local(current) {
                self.last_known = current.to_string();
            }
        }

        let notice = NavigationAction::Notice(Notice::ConnectionLost);
        if self.state.is_fallback() && self.on_screen().is_none_or(|url| self.is_local(url)) {
            return vec![notice];
        }

        self.transition(NavigationState::LoadingFallback);
        vec![self.load(self.fallback_url.clone()), notice]
    }

    /// Pre-flight guard for a navigation the content initiated.
    ///
    /// `reachable` is a live probe taken at the moment of the request.
    #[must_use]
    pub fn should_intercept(&self, target: &str, reachable: bool) -> Interception {
        if self.is_local(target) || reachable {
            Interception::Allow
        } else {
            debug!(url = %target, "navigation refused while offline");
            Interception::Deny(Notice::NoConnection)
        }
    }

    /// The surface started loading `url`.
    pub fn on_page_started(&mut self, url: &str) {
        self.requested = None;
        self.displayed = Some(url.to_string());
        self.displayed_finished = false;

        if self.state == NavigationState::Booting {
            return;
        }

        if self.is_local(url) {
            self.transition(NavigationState::LoadingFallback);
            return;
        }

        self.last_known = url.to_string();
        if self.online {
            self.transition(NavigationState::LoadingRemote);
        }
    }

    /// The surface finished rendering `url`.
    ///
    /// Returns `true` when this made content ready (remote or fallback).
    pub fn on_page_finished(&mut self, url: &str) -> bool {
        if self.displayed.as_deref() != Some(url) {
            self.displayed = Some(url.to_string());
        }
        self.displayed_finished = true;

        match self.state {
            NavigationState::LoadingFallback if self.is_local(url) => {
                self.transition(NavigationState::FallbackReady);
                true
            },
            NavigationState::LoadingRemote if self.online && !self.is_local(url) => {
                self.transition(NavigationState::ContentReady);
                true
            },
            _ => false,
        }
    }

    /// A request failed.
    ///
    /// Only primary-document failures matter. Offline, the user is told to
    /// wait, and a first load that never rendered falls back to the bundled
    /// document. Online, the failure is reported and nothing else happens.
    pub fn on_load_failed(
        &mut self,
        url: &str,
        is_primary: bool,
        reachable: bool,
    ) -> Vec<NavigationAction> {
        if !is_primary {
            return Vec::new();
        }

        if url == self.fallback_url {
            warn!(url, "fallback document failed to load");
            return Vec::new();
        }

        if reachable {
            warn!(url, "primary document failed to load");
            return vec![NavigationAction::Notice(Notice::LoadFailed)];
        }

        let notice = NavigationAction::Notice(Notice::WaitingForConnection);
        if self.state == NavigationState::LoadingRemote {
            self.transition(NavigationState::LoadingFallback);
            return vec![self.load(self.fallback_url.clone()), notice];
        }
        vec![notice]
    }

    /// Explicit reload request.
    ///
    /// On the fallback document with connectivity back, reloading means going
    /// back to the last remote location rather than re-rendering the fallback.
    pub fn reload(&mut self) -> Vec<NavigationAction> {
        if self.state == NavigationState::Booting {
            return Vec::new();
        }

        if self.online && self.state.is_fallback() && self.showing_fallback() {
            let target = self.last_known.clone();
            self.transition(NavigationState::LoadingRemote);
            return vec![self.load(target)];
        }
        vec![NavigationAction::Reload]
    }

    /// Whether the fallback document itself is on screen or about to be.
    fn showing_fallback(&self) -> bool {
        self.on_screen().is_none_or(|url| url == self.fallback_url)
    }

    /// Document requested or, failing that, displayed.
    fn on_screen(&self) -> Option<&str> {
        self.requested.as_deref().or(self.displayed.as_deref())
    }

    fn load(&mut self, url: String) -> NavigationAction {
        self.requested = Some(url.clone());
        NavigationAction::Load(url)
    }

    fn transition(&mut self, next: NavigationState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "navigation transition");
            self.state = next;
        }
    }
}
