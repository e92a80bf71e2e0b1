//! Shell state machine.
//!
//! Composes the core machines into the one owned state object a host runs:
//! navigation, connectivity, permissions, the file-chooser slot, overlays,
//! the exit guard and the capability bridge.
//!
//! This is a pure state machine: it consumes [`ShellEvent`]s and bridge
//! calls and produces [`ShellAction`]s for the driver to execute.
//!
//! # Responsibilities
//!
//! - Boots into remote content or the fallback without waiting on the network
//! - Routes reachability changes through the debouncing monitor before they
//!   reach navigation
//! - Drives the progress indicator and the one-time splash fade from page
//!   lifecycle events
//! - Tears down exactly once: pending file request resolved, connectivity
//!   subscription released, no permission request started afterwards

use std::{ops::Sub, time::Duration};

use tracing::{debug, info, warn};
use webshell_core::{
    BackOutcome, ConnectivityMonitor, ConnectivityTransition, ExitGuard, FileChooser,
    FileChooserAction, Interception, NavigationAction, Navigator, Notice, OverlayAction,
    OverlayController, PermissionAction, PermissionSequencer, ShellConfig, WebResource,
};
use webshell_proto::{BridgeReply, CapabilityCall};

use crate::{Bridge, Device, ShellAction, ShellEvent};

/// Web shell state machine.
///
/// Generic over `Instant` to support both real time and virtual time for
/// deterministic testing.
#[derive(Debug, Clone)]
pub struct Shell<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    config: ShellConfig,
    navigator: Navigator,
    connectivity: ConnectivityMonitor,
    permissions: PermissionSequencer<I>,
    files: FileChooser,
    overlay: OverlayController,
    exit_guard: ExitGuard<I>,
    bridge: Bridge,
    booted: bool,
    finishing: bool,
}

impl<I> Shell<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create an unbooted shell.
    pub fn new(config: ShellConfig) -> Self {
        Self {
            navigator: Navigator::from_config(&config),
            connectivity: ConnectivityMonitor::new(false),
            permissions: PermissionSequencer::from_config(&config),
            files: FileChooser::new(),
            overlay: OverlayController::new(config.has_splash(), config.timings.splash_fade()),
            exit_guard: ExitGuard::new(config.timings.exit_window()),
            bridge: Bridge::from_config(&config),
            config,
            booted: false,
            finishing: false,
        }
    }

    /// Configuration the shell was created with.
    #[must_use]
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Navigation state machine.
    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Connectivity monitor.
    #[must_use]
    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    /// Permission sequencer.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSequencer<I> {
        &self.permissions
    }

    /// File-chooser slot.
    #[must_use]
    pub fn files(&self) -> &FileChooser {
        &self.files
    }

    /// Overlay controller.
    #[must_use]
    pub fn overlay(&self) -> &OverlayController {
        &self.overlay
    }

    /// Exit guard.
    #[must_use]
    pub fn exit_guard(&self) -> &ExitGuard<I> {
        &self.exit_guard
    }

    /// Capability bridge.
    #[must_use]
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Whether [`Shell::boot`] ran.
    #[must_use]
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Whether teardown started.
    #[must_use]
    pub fn is_finishing(&self) -> bool {
        self.finishing
    }

    /// Start the session.
    ///
    /// `reachable` is a non-blocking probe taken by the host.
    pub fn boot(&mut self, now: I, reachable: bool) -> Vec<ShellAction> {
        if self.booted {
            warn!("ignoring repeated boot");
            return Vec::new();
        }
        self.booted = true;
        info!(
            app = %self.config.app_name,
            platform = %self.config.platform,
            tier = %self.config.tier(),
            reachable,
            "shell booting"
        );

        let mut actions = Vec::new();
        self.connectivity = ConnectivityMonitor::new(reachable);
        if self.connectivity.register() {
            actions.push(ShellAction::SubscribeConnectivity);
        }

        let navigation = self.navigator.boot(reachable);
        actions.extend(navigation.into_iter().map(navigation_action));
        self.permissions.schedule(now, self.finishing);
        actions
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: ShellEvent, now: I) -> Vec<ShellAction> {
        if self.finishing {
            debug!(?event, "shell finishing, ignoring event");
            return Vec::new();
        }

        match event {
            ShellEvent::Connectivity(signal) => match self.connectivity.observe(signal) {
                Some(ConnectivityTransition::Available) => {
                    self.navigate(|nav| nav.on_connectivity_available())
                },
                Some(ConnectivityTransition::Lost) => {
                    self.navigate(|nav| nav.on_connectivity_lost())
                },
                None => Vec::new(),
            },
            ShellEvent::PageStarted { url } => {
                self.navigator.on_page_started(&url);
                self.overlay.navigation_started().map(overlay_action).into_iter().collect()
            },
            ShellEvent::PageFinished { url } => {
                if self.navigator.on_page_finished(&url) {
                    self.overlay.content_ready().into_iter().map(overlay_action).collect()
                } else {
                    self.overlay.navigation_stopped().map(overlay_action).into_iter().collect()
                }
            },
            ShellEvent::LoadFailed { url, main_frame } => {
                let online = self.connectivity.is_online();
                self.navigate(|nav| nav.on_load_failed(&url, main_frame, online))
            },
            ShellEvent::BackPressed { can_go_back } => {
                match self.exit_guard.back_pressed(now, can_go_back) {
                    BackOutcome::NavigateBack => vec![ShellAction::GoBack],
                    BackOutcome::Armed => {
                        vec![ShellAction::ShowNotice(Notice::PressBackAgain)]
                    },
                    BackOutcome::Exit => self.exit(),
                }
            },
            ShellEvent::FileChooserRequested { request } => {
                self.files.open(request).into_iter().map(file_action).collect()
            },
            ShellEvent::FileChooserLaunchFailed { request } => {
                self.files.launch_failed(request).map(file_action).into_iter().collect()
            },
            ShellEvent::FileChooserCompleted { request, files } => {
                self.files.complete(request, files).map(file_action).into_iter().collect()
            },
            ShellEvent::PermissionResults { results } => {
                self.permissions.on_batch_result(&results).map(permission_action).into_iter().collect()
            },
            ShellEvent::FollowUpPermissionResult { granted } => {
                self.permissions.on_follow_up_result(granted);
                Vec::new()
            },
            ShellEvent::Biometric(outcome) => self.bridge.on_biometric(outcome),
            ShellEvent::WebPermissionRequest { request, resources } => {
                let granted: Vec<WebResource> =
                    resources.into_iter().filter(|r| self.permissions.allows(*r)).collect();
                vec![ShellAction::ResolveWebPermission { request, granted }]
            },
            ShellEvent::SplashFaded => {
                self.overlay.fade_finished();
                Vec::new()
            },
            ShellEvent::Tick => {
                self.exit_guard.tick(now);
                self.permissions.tick(now, self.finishing).map(permission_action).into_iter().collect()
            },
        }
    }

    /// Answer a raw bridge message from embedded content.
    ///
    /// Malformed messages and unknown capabilities are logged and answered
    /// with an error reply; they never reach navigation or rendering.
    pub fn invoke<D>(&mut self, raw: &str, device: &mut D) -> (BridgeReply, Vec<ShellAction>)
    where
        D: Device + ?Sized,
    {
        if self.finishing {
            return (BridgeReply::error("shell is closing"), Vec::new());
        }

        let call = match CapabilityCall::decode(raw) {
            Ok(call) => call,
            Err(e) => {
                warn!(error = %e, capability = ?e.capability(), "rejecting bridge misuse");
                return (BridgeReply::error(e.to_string()), Vec::new());
            },
        };

        let (reply, requested) = self.bridge.dispatch(call, device, &self.permissions);
        let mut actions = Vec::with_capacity(requested.len());
        for action in requested {
            match action {
                ShellAction::Reload => {
                    actions.extend(self.navigator.reload().into_iter().map(navigation_action));
                },
                ShellAction::Exit => actions.extend(self.exit()),
                other => actions.push(other),
            }
        }
        (reply, actions)
    }

    /// Pre-flight guard for a navigation the content initiated.
    ///
    /// Returns whether the navigation is cancelled, plus the notice to show
    /// when it is.
    pub fn should_intercept(&self, url: &str, reachable: bool) -> (bool, Vec<ShellAction>) {
        match self.navigator.should_intercept(url, reachable) {
            Interception::Allow => (false, Vec::new()),
            Interception::Deny(_) if self.finishing => (true, Vec::new()),
            Interception::Deny(notice) => (true, vec![ShellAction::ShowNotice(notice)]),
        }
    }

    /// Terminate the app: teardown followed by [`ShellAction::Exit`].
    pub fn exit(&mut self) -> Vec<ShellAction> {
        if self.finishing {
            return Vec::new();
        }
        info!("shell exiting");
        let mut actions = self.teardown();
        actions.push(ShellAction::Exit);
        actions
    }

    /// Host-initiated teardown. Safe to call any number of times.
    pub fn shutdown(&mut self) -> Vec<ShellAction> {
        if self.finishing {
            return Vec::new();
        }
        info!("shell shutting down");
        self.teardown()
    }

    fn teardown(&mut self) -> Vec<ShellAction> {
        self.finishing = true;
        self.permissions.cancel();

        let mut actions = Vec::new();
        if let Some(resolved) = self.files.cancel() {
            actions.push(file_action(resolved));
        }
        if let Some(hide) = self.overlay.navigation_stopped() {
            actions.push(overlay_action(hide));
        }
        if self.connectivity.release() {
            actions.push(ShellAction::UnsubscribeConnectivity);
        }
        actions
    }

    fn navigate(&mut self, f: impl FnOnce(&mut Navigator) -> Vec<NavigationAction>) -> Vec<ShellAction> {
        f(&mut self.navigator).into_iter().map(navigation_action).collect()
    }
}

fn navigation_action(action: NavigationAction) -> ShellAction {
    match action {
        NavigationAction::Load(url) => ShellAction::LoadUrl(url),
        NavigationAction::Reload => ShellAction::Reload,
        NavigationAction::Notice(notice) => ShellAction::ShowNotice(notice),
    }
}

fn overlay_action(action: OverlayAction) -> ShellAction {
    match action {
        OverlayAction::ShowProgress => ShellAction::ShowProgress,
        OverlayAction::HideProgress => ShellAction::HideProgress,
        OverlayAction::FadeOutSplash { duration } => ShellAction::FadeOutSplash { duration },
    }
}

fn file_action(action: FileChooserAction) -> ShellAction {
    match action {
        FileChooserAction::Launch { request } => ShellAction::LaunchFilePicker { request },
        FileChooserAction::Resolve { request, files } => {
            ShellAction::ResolveFileRequest { request, files }
        },
    }
}

fn permission_action(action: PermissionAction) -> ShellAction {
    match action {
        PermissionAction::RequestBatch(batch) => ShellAction::RequestPermissions(batch),
        PermissionAction::RequestFollowUp(p) => ShellAction::RequestFollowUpPermission(p),
    }
}
