//! Error types for the shell core.
//!
//! The state machines themselves are infallible: unexpected events are
//! ignored and logged. Only loading and validating the generator-supplied
//! configuration can fail.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::ShellConfig`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {reason}")]
    Unreadable {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O failure
        reason: String,
    },

    /// Config text is not valid TOML for the config schema
    #[error("invalid config: {0}")]
    Parse(String),

    /// A required text field is empty
    #[error("config field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// Remote URL is not an http(s) URL
    #[error("remote url must be http or https: {0}")]
    InvalidRemoteUrl(String),

    /// Fallback document lies outside the host's local asset root
    #[error("fallback document {url} is not under {root}")]
    FallbackNotLocal {
        /// Configured fallback URL
        url: String,
        /// Local asset root of the host platform
        root: &'static str,
    },

    /// A timing value that must be positive is zero
    #[error("timing `{0}` must be greater than zero")]
    ZeroTiming(&'static str),
}

impl ConfigError {
    /// Whether the error comes from the file system rather than the content.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Unreadable { .. })
    }
}
