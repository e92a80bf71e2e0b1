//! Deterministic simulation harness for web shell testing.
//!
//! Virtual-time implementations of the Environment, Driver and Device seams
//! for deterministic, reproducible testing of the shell under connectivity
//! flapping, page lifecycle races and hostile bridge traffic.
//!
//! # Model-Based Testing
//!
//! [`ShellWorld`] drives a [`webshell_app::Shell`] synchronously from
//! [`Operation`]s, which proptest and the fuzzer generate. The async
//! [`SimDriver`] and [`SimEnv`] run the real [`webshell_app::Runtime`] loop
//! on a virtual clock.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the shell's
//! lifecycle invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chaos;
pub mod invariants;
pub mod operation;
pub mod sim_device;
pub mod sim_driver;
pub mod sim_env;
pub mod world;

pub use chaos::ConnectivityChaos;
pub use invariants::{
    ConnectivityAgreement, ContentRequiresConnectivity, Invariant, InvariantRegistry,
    InvariantResult, LastKnownIsRemote, ShellSnapshot, SingleFileRequest, SplashDismissedOnce,
    TeardownIsFinal, Violation,
};
pub use operation::Operation;
pub use sim_device::{DeviceCall, SimDevice};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::SimEnv;
pub use world::ShellWorld;
