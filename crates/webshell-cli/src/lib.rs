//! Web shell tooling.
//!
//! Library side of the `webshell` binary: config checks, permission plans,
//! the bridge shim, seeded chaos runs and scripted session replay through the
//! real runtime. Every command writes to a caller-supplied writer.
//!
//! # Components
//!
//! - [`commands`]: `check`, `plan`, `shim` and `chaos`
//! - [`script`]: line-oriented session script parser
//! - [`replay`]: runs a parsed script through the runtime on a virtual clock
//! - [`LogDriver`]: driver that traces every host action

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod commands;
mod error;
pub mod log_driver;
pub mod script;
mod session;

pub use error::CliError;
pub use log_driver::LogDriver;
pub use session::{SessionSummary, replay};
