//! Web shell runtime core.
//!
//! Pure state machines for the embedded web shell. Nothing in this crate
//! performs I/O: every machine takes its input (events, the current time, the
//! result of a reachability probe) as arguments and returns the effects the
//! host must carry out as values.
//!
//! # Components
//!
//! - [`Navigator`]: remote vs. local-fallback content policy
//! - [`ConnectivityMonitor`]: debounces host reachability callbacks
//! - [`PermissionSequencer`]: staged, tier-dependent permission requests
//! - [`FileChooser`]: the single pending file-picker continuation
//! - [`OverlayController`]: progress indicator and splash overlay
//! - [`ExitGuard`]: double back-press to exit
//! - [`ShellConfig`]: generator-supplied, read-only configuration

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod connectivity;
pub mod env;
pub mod error;
pub mod exit_guard;
pub mod file_chooser;
pub mod navigation;
pub mod notice;
pub mod overlay;
pub mod permissions;
pub mod profile;

pub use config::{ShellConfig, ShellTimings};
pub use connectivity::{
    ConnectivityMonitor, ConnectivitySignal, ConnectivityTransition, NetworkId, SubscriptionState,
};
pub use env::Environment;
pub use error::ConfigError;
pub use exit_guard::{BackOutcome, ExitGuard};
pub use file_chooser::{FileChooser, FileChooserAction, FileRequestId};
pub use navigation::{Interception, NavigationAction, NavigationState, Navigator};
pub use notice::Notice;
pub use overlay::{OverlayAction, OverlayController, SplashState};
pub use permissions::{
    Permission, PermissionAction, PermissionSequencer, PermissionStatus, SequencerStage,
    WebResource,
};
pub use profile::{CapabilityTier, HostPlatform};
