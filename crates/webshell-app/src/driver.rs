//! Driver trait for abstracting host I/O.
//!
//! The [`Driver`] trait decouples the shell runtime from a concrete host.
//! Each host adapter (Android WebView, iOS WKWebView, the simulation driver,
//! the CLI's logging driver) implements it, while the generic
//! [`crate::Runtime`] handles all orchestration.

use crate::{Device, ShellAction};

/// Abstracts host operations for the shell runtime.
///
/// All methods are called from the runtime's single execution context.
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Host-specific error type
/// - [`Device`](Driver::Device): Hardware used by bridge calls
pub trait Driver: Send {
    /// Host-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Hardware used by bridge calls.
    type Device: Device;

    /// Non-blocking reachability probe.
    fn is_reachable(&mut self) -> bool;

    /// Hardware access for bridge calls.
    fn device(&mut self) -> &mut Self::Device;

    /// Carry out one shell action on the UI context.
    ///
    /// # Errors
    ///
    /// Returns an error if the host can no longer perform actions (for
    /// example the surface was destroyed).
    fn perform(&mut self, action: ShellAction) -> Result<(), Self::Error>;

    /// Release host resources after the runtime stopped.
    fn stop(&mut self);
}
