//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use webshell_core::{NavigationState, SequencerStage, SubscriptionState};

use super::{Invariant, InvariantResult, ShellSnapshot, Violation};

/// Remote content is never ready while connectivity is lost.
pub struct ContentRequiresConnectivity;

impl Invariant for ContentRequiresConnectivity {
    fn name(&self) -> &'static str {
        "content_requires_connectivity"
    }

    fn check(&self, state: &ShellSnapshot) -> InvariantResult {
        if state.state == NavigationState::ContentReady && !state.navigator_online {
            return Err(Violation {
                invariant: self.name(),
                message: format!("ContentReady while offline (last known {})", state.last_known),
            });
        }
        Ok(())
    }
}

/// Navigation acts on the same online flag the monitor debounced.
///
/// A divergence means a raw reachability callback reached navigation without
/// going through the monitor.
pub struct ConnectivityAgreement;

impl Invariant for ConnectivityAgreement {
    fn name(&self) -> &'static str {
        "connectivity_agreement"
    }

    fn check(&self, state: &ShellSnapshot) -> InvariantResult {
        if state.booted && state.navigator_online != state.monitor_online {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "navigator online={} but monitor online={}",
                    state.navigator_online, state.monitor_online
                ),
            });
        }
        Ok(())
    }
}

/// The restore target is always remote.
pub struct LastKnownIsRemote;

impl Invariant for LastKnownIsRemote {
    fn name(&self) -> &'static str {
        "last_known_is_remote"
    }

    fn check(&self, state: &ShellSnapshot) -> InvariantResult {
        if state.booted && state.last_known_is_local {
            return Err(Violation {
                invariant: self.name(),
                message: format!("last known location {} is bundled", state.last_known),
            });
        }
        Ok(())
    }
}

/// At most one file-chooser callback is outstanding.
pub struct SingleFileRequest;

impl Invariant for SingleFileRequest {
    fn name(&self) -> &'static str {
        "single_file_request"
    }

    fn check(&self, state: &ShellSnapshot) -> InvariantResult {
        if state.pending_file_requests > 1 {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{} pending file requests", state.pending_file_requests),
            });
        }
        Ok(())
    }
}

/// The splash fade starts at most once per session.
pub struct SplashDismissedOnce;

impl Invariant for SplashDismissedOnce {
    fn name(&self) -> &'static str {
        "splash_dismissed_once"
    }

    fn check(&self, state: &ShellSnapshot) -> InvariantResult {
        let fades = state.counters.splash_fades.max(state.splash_dismissals as usize);
        if fades > 1 {
            return Err(Violation {
                invariant: self.name(),
                message: format!("splash dismissed {fades} times"),
            });
        }
        Ok(())
    }
}

/// Teardown releases everything and nothing starts afterwards.
///
/// - the reachability subscription is released exactly once
/// - no file-chooser callback is left dangling
/// - no permission dialog is scheduled or shown
/// - the app exits at most once
pub struct TeardownIsFinal;

impl Invariant for TeardownIsFinal {
    fn name(&self) -> &'static str {
        "teardown_is_final"
    }

    fn check(&self, state: &ShellSnapshot) -> InvariantResult {
        let violation = |message: String| Err(Violation { invariant: self.name(), message });
        let counters = &state.counters;

        if counters.unsubscribes > 1 {
            return violation(format!("subscription released {} times", counters.unsubscribes));
        }
        if counters.exits > 1 {
            return violation(format!("exit emitted {} times", counters.exits));
        }
        if counters.permission_requests_after_teardown > 0 {
            return violation(format!(
                "{} permission requests after teardown",
                counters.permission_requests_after_teardown
            ));
        }
        if !state.finishing {
            return Ok(());
        }

        if state.subscription == SubscriptionState::Registered {
            return violation("subscription still registered after teardown".to_string());
        }
        if state.pending_file_requests > 0 {
            return violation("file request left pending after teardown".to_string());
        }
        if state.permission_stage == SequencerStage::Scheduled {
            return violation("permission batch still scheduled after teardown".to_string());
        }
        Ok(())
    }
}
