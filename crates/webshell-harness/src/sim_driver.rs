//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` stands in for a WebView host during deterministic testing. It
//! implements [`Driver`] so the same [`webshell_app::Runtime`] orchestration
//! code runs in both production hosts and simulation.
//!
//! Clones share state, so a test keeps one clone to steer reachability and
//! inspect performed actions while the runtime owns the other.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;
use webshell_app::{Driver, ShellAction};
use webshell_core::Notice;

use crate::SimDevice;

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Shared state between the runtime's driver and the test's clone.
#[derive(Debug, Default)]
struct SharedState {
    reachable: bool,
    performed: Vec<ShellAction>,
    detached: bool,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
#[derive(Debug, Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    device: SimDevice,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a driver with a reachable network and a fully equipped device.
    pub fn new() -> Self {
        Self::with_device(SimDevice::new())
    }

    /// Create a driver around specific hardware.
    pub fn with_device(device: SimDevice) -> Self {
        let state = SharedState { reachable: true, ..SharedState::default() };
        Self { state: Arc::new(Mutex::new(state)), device }
    }

    /// Set what the reachability probe reports.
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Simulate the rendering surface being destroyed: every later action
    /// fails.
    pub fn detach(&self) {
        self.lock().detached = true;
    }

    /// Every action performed so far, in order.
    pub fn performed(&self) -> Vec<ShellAction> {
        self.lock().performed.clone()
    }

    /// Take and clear the performed actions.
    pub fn take_performed(&self) -> Vec<ShellAction> {
        std::mem::take(&mut self.lock().performed)
    }

    /// URLs loaded so far, in order.
    pub fn loads(&self) -> Vec<String> {
        self.lock()
            .performed
            .iter()
            .filter_map(|a| match a {
                ShellAction::LoadUrl(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    /// Notices shown so far, in order.
    pub fn notices(&self) -> Vec<Notice> {
        self.lock()
            .performed
            .iter()
            .filter_map(|a| match a {
                ShellAction::ShowNotice(notice) => Some(notice.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of performed actions equal to `action`.
    pub fn count(&self, action: &ShellAction) -> usize {
        self.lock().performed.iter().filter(|a| *a == action).count()
    }

    /// Whether the runtime released the driver.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// The simulated hardware.
    pub fn sim_device(&self) -> &SimDevice {
        &self.device
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Device = SimDevice;

    fn is_reachable(&mut self) -> bool {
        self.lock().reachable
    }

    fn device(&mut self) -> &mut Self::Device {
        &mut self.device
    }

    fn perform(&mut self, action: ShellAction) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if state.detached {
            return Err(SimDriverError(format!("surface destroyed before {action:?}")));
        }
        trace!(?action, "performing");
        state.performed.push(action);
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_performed_actions() {
        let mut driver = SimDriver::new();
        let observer = driver.clone();

        driver.perform(ShellAction::LoadUrl("https://app.example.com/".into())).unwrap();
        driver.perform(ShellAction::ShowNotice(Notice::NoInternet)).unwrap();

        assert_eq!(observer.loads(), vec!["https://app.example.com/".to_string()]);
        assert_eq!(observer.notices(), vec![Notice::NoInternet]);
    }

    #[test]
    fn reachability_is_steerable() {
        let mut driver = SimDriver::new();
        assert!(driver.is_reachable());
        driver.clone().set_reachable(false);
        assert!(!driver.is_reachable());
    }

    #[test]
    fn detached_surface_rejects_actions() {
        let mut driver = SimDriver::new();
        driver.detach();
        assert!(driver.perform(ShellAction::Reload).is_err());
        assert!(driver.performed().is_empty());
    }
}
