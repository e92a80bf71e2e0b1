//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the shell at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use std::{ops::Sub, time::Duration};

use serde::Serialize;
use webshell_app::{Shell, ShellAction};
use webshell_core::{NavigationState, SequencerStage, SubscriptionState};

/// Snapshot of one shell's observable state.
#[derive(Debug, Clone)]
pub struct ShellSnapshot {
    /// Whether the shell booted.
    pub booted: bool,
    /// Whether teardown started.
    pub finishing: bool,
    /// Navigation state.
    pub state: NavigationState,
    /// Online flag as navigation sees it.
    pub navigator_online: bool,
    /// Online flag as the connectivity monitor sees it.
    pub monitor_online: bool,
    /// Restore target.
    pub last_known: String,
    /// Whether the restore target is a bundled document.
    pub last_known_is_local: bool,
    /// Unresolved file-chooser callbacks.
    pub pending_file_requests: usize,
    /// Times the splash fade started.
    pub splash_dismissals: u32,
    /// Reachability subscription state.
    pub subscription: SubscriptionState,
    /// Permission sequencer stage.
    pub permission_stage: SequencerStage,
    /// Counters over actions emitted so far.
    pub counters: ActionCounters,
}

impl ShellSnapshot {
    /// Snapshot of a shell that was never booted.
    pub fn unbooted() -> Self {
        Self {
            booted: false,
            finishing: false,
            state: NavigationState::Booting,
            navigator_online: false,
            monitor_online: false,
            last_known: String::new(),
            last_known_is_local: false,
            pending_file_requests: 0,
            splash_dismissals: 0,
            subscription: SubscriptionState::Inactive,
            permission_stage: SequencerStage::Idle,
            counters: ActionCounters::default(),
        }
    }

    /// Extract the observable state of a shell.
    pub fn from_shell<I>(shell: &Shell<I>) -> Self
    where
        I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
    {
        let navigator = shell.navigator();
        Self {
            booted: shell.is_booted(),
            finishing: shell.is_finishing(),
            state: navigator.state(),
            navigator_online: navigator.is_online(),
            monitor_online: shell.connectivity().is_online(),
            last_known: navigator.last_known().to_string(),
            last_known_is_local: navigator.is_local(navigator.last_known()),
            pending_file_requests: shell.files().pending_count(),
            splash_dismissals: shell.overlay().dismissals(),
            subscription: shell.connectivity().subscription(),
            permission_stage: shell.permissions().stage(),
            counters: ActionCounters::default(),
        }
    }

    /// Attach action counters.
    #[must_use]
    pub fn with_counters(mut self, counters: ActionCounters) -> Self {
        self.counters = counters;
        self
    }
}

/// Running counts over the actions a shell emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounters {
    /// `LoadUrl` actions.
    pub loads: usize,
    /// Notices shown.
    pub notices: usize,
    /// Splash fades started.
    pub splash_fades: usize,
    /// Reachability subscriptions registered.
    pub subscribes: usize,
    /// Reachability subscriptions released.
    pub unsubscribes: usize,
    /// `Exit` actions.
    pub exits: usize,
    /// Permission dialogs requested after teardown started.
    pub permission_requests_after_teardown: usize,
}

impl ActionCounters {
    /// Fold a batch of emitted actions into the counters.
    ///
    /// `finishing` is the shell's teardown flag before the batch was emitted.
    pub fn record(&mut self, actions: &[ShellAction], finishing: bool) {
        for action in actions {
            match action {
                ShellAction::LoadUrl(_) => self.loads += 1,
                ShellAction::ShowNotice(_) => self.notices += 1,
                ShellAction::FadeOutSplash { .. } => self.splash_fades += 1,
                ShellAction::SubscribeConnectivity => self.subscribes += 1,
                ShellAction::UnsubscribeConnectivity => self.unsubscribes += 1,
                ShellAction::Exit => self.exits += 1,
                ShellAction::RequestPermissions(_) | ShellAction::RequestFollowUpPermission(_)
                    if finishing =>
                {
                    self.permission_requests_after_teardown += 1;
                },
                _ => {},
            }
        }
    }
}
