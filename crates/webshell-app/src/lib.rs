//! Application layer for the web shell
//!
//! Composes the pure state machines into a single shell and runs it on one
//! execution context, enabling deterministic simulation testing with the same
//! code that runs in a host.
//!
//! # Components
//!
//! - [`Shell`]: shell state machine (events in, actions out)
//! - [`Bridge`]: capability bridge dispatcher over a [`Device`]
//! - [`Driver`]: trait for host-specific I/O
//! - [`Runtime`]: generic event loop using a Driver
//! - [`ShellHandle`]: thread-safe entry point for host callbacks

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod bridge;
mod device;
mod driver;
mod error;
mod event;
mod runtime;
mod shell;
mod system_env;

pub use action::ShellAction;
pub use bridge::Bridge;
pub use device::{BiometricOutcome, Device, DeviceError, DeviceInfo};
pub use driver::Driver;
pub use error::ShellClosed;
pub use event::ShellEvent;
pub use runtime::{Inbound, Runtime, ShellHandle};
pub use shell::Shell;
pub use system_env::SystemEnv;
