//! CLI error types.

use std::{io, path::PathBuf};

use thiserror::Error;
use webshell_app::ShellClosed;
use webshell_core::ConfigError;
use webshell_harness::SimDriverError;

use crate::script::ScriptError;

/// Errors that end a `webshell` command.
#[derive(Error, Debug)]
pub enum CliError {
    /// Shell configuration failed to load or validate
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session script file could not be read
    #[error("cannot read script {path}: {source}")]
    ScriptUnreadable {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// Session script is malformed
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Writing the report failed
    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),

    /// The shell runtime stopped while a handle still needed it
    #[error(transparent)]
    Closed(#[from] ShellClosed),

    /// The host driver failed mid-session
    #[error("host driver failed: {0}")]
    Driver(#[from] SimDriverError),

    /// A chaos run broke a shell invariant
    #[error("chaos run with seed {seed} violated {count} invariant(s)")]
    InvariantViolated {
        /// Seed that reproduces the run
        seed: u64,
        /// Violations found at the failing step
        count: usize,
    },
}

impl CliError {
    /// Whether the error comes from user input rather than the shell.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Config(_) | Self::ScriptUnreadable { .. } | Self::Script(_))
    }
}
