//! Error types for the shell runtime.

use thiserror::Error;

/// The runtime inbox is closed; the shell has shut down.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("shell runtime has shut down")]
pub struct ShellClosed;
