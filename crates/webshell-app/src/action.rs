//! Shell output actions.
//!
//! Effects the host performs on its UI context. The shell never performs them
//! itself.

use std::time::Duration;

use webshell_core::{FileRequestId, Notice, Permission, WebResource};

/// Actions produced by the [`crate::Shell`] for the driver to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    /// Load a URL in the surface.
    LoadUrl(String),
    /// Reload the current document.
    Reload,
    /// Clear the surface's content cache.
    ClearCache,
    /// Go back in the surface history.
    GoBack,
    /// Show a transient notice.
    ShowNotice(Notice),
    /// Show the progress indicator.
    ShowProgress,
    /// Hide the progress indicator.
    HideProgress,
    /// Fade the splash overlay out.
    FadeOutSplash {
        /// Animation length.
        duration: Duration,
    },
    /// Show the system permission dialog for this ordered batch.
    RequestPermissions(Vec<Permission>),
    /// Show the system dialog for one dependent permission.
    RequestFollowUpPermission(Permission),
    /// Launch the system file picker.
    LaunchFilePicker {
        /// Callback id the result belongs to.
        request: FileRequestId,
    },
    /// Invoke a stored file-chooser callback.
    ResolveFileRequest {
        /// Callback id.
        request: FileRequestId,
        /// Selected files, `None` for no result.
        files: Option<Vec<String>>,
    },
    /// Show the biometric prompt.
    PromptBiometric,
    /// Evaluate a script in the page (callback delivery).
    EvaluateScript(String),
    /// Toggle screenshot protection.
    SetSecureScreen(bool),
    /// Keep the display awake or release it.
    KeepScreenOn(bool),
    /// Answer a web-content permission request.
    ResolveWebPermission {
        /// Host-assigned request id.
        request: u64,
        /// Resources granted. Anything requested but absent is denied.
        granted: Vec<WebResource>,
    },
    /// Register the reachability callback.
    SubscribeConnectivity,
    /// Unregister the reachability callback.
    UnsubscribeConnectivity,
    /// Terminate the app.
    Exit,
}
