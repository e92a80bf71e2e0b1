//! Shell input events.
//!
//! Every asynchronous host callback (reachability, page lifecycle, picker and
//! permission results, timers) becomes one [`ShellEvent`] on the runtime
//! inbox, so all state mutation happens on one execution context.

use webshell_core::{ConnectivitySignal, FileRequestId, Permission, WebResource};

use crate::BiometricOutcome;

/// Events processed by the [`crate::Shell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// Host reachability callback.
    Connectivity(ConnectivitySignal),

    /// The surface started loading a document.
    PageStarted {
        /// Document URL.
        url: String,
    },

    /// The surface finished rendering a document.
    PageFinished {
        /// Document URL.
        url: String,
    },

    /// A request failed.
    LoadFailed {
        /// Failing URL.
        url: String,
        /// Whether it was the primary document request.
        main_frame: bool,
    },

    /// Hardware or gesture back.
    BackPressed {
        /// Whether the surface has history to go back to.
        can_go_back: bool,
    },

    /// Content opened a file input; the host stored its callback under
    /// `request`.
    FileChooserRequested {
        /// Host-assigned callback id.
        request: FileRequestId,
    },

    /// The system picker could not be launched.
    FileChooserLaunchFailed {
        /// Callback id.
        request: FileRequestId,
    },

    /// The system picker returned.
    FileChooserCompleted {
        /// Callback id.
        request: FileRequestId,
        /// Selected file URIs, `None` when cancelled.
        files: Option<Vec<String>>,
    },

    /// Results of the permission batch.
    PermissionResults {
        /// Grant state per requested permission.
        results: Vec<(Permission, bool)>,
    },

    /// Result of the dependent follow-up request.
    FollowUpPermissionResult {
        /// Whether it was granted.
        granted: bool,
    },

    /// The biometric prompt reported.
    Biometric(BiometricOutcome),

    /// Embedded content asked for a protected web resource.
    WebPermissionRequest {
        /// Host-assigned request id.
        request: u64,
        /// Requested resources.
        resources: Vec<WebResource>,
    },

    /// The splash fade animation finished.
    SplashFaded,

    /// Periodic timer tick.
    Tick,
}
