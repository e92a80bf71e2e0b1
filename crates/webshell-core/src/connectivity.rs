//! Connectivity monitor.
//!
//! Host reachability callbacks repeat themselves: a network can be announced
//! several times, and losing one of two networks is reported as a loss. The
//! monitor folds those callbacks into genuine online/offline changes.
//!
//! # Invariants
//!
//! - Consecutive transitions always alternate: never two `Available` or two
//!   `Lost` in a row
//! - No transition is delivered outside the `Registered` subscription state
//! - `release` is idempotent

use std::collections::BTreeSet;

use tracing::debug;

/// Host-assigned network handle.
pub type NetworkId = u64;

/// Raw reachability callback from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivitySignal {
    /// A network became usable.
    Available(NetworkId),
    /// A network went away.
    Lost(NetworkId),
}

/// Genuine connectivity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityTransition {
    /// The device went from offline to online.
    Available,
    /// The device went from online to offline.
    Lost,
}

/// Lifecycle of the host subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Not registered yet.
    Inactive,
    /// Registered; signals are processed.
    Registered,
    /// Unregistered at teardown; signals are ignored.
    Released,
}

/// Debouncing connectivity monitor.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    networks: BTreeSet<NetworkId>,
    online: bool,
    subscription: SubscriptionState,
}

impl ConnectivityMonitor {
    /// Create a monitor seeded with the boot probe result.
    ///
    /// Seeding keeps the host's initial announcement of the already-active
    /// network from being reported as a change.
    pub fn new(initially_online: bool) -> Self {
        Self {
            networks: BTreeSet::new(),
            online: initially_online,
            subscription: SubscriptionState::Inactive,
        }
    }

    /// Online state as last delivered.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Subscription state.
    #[must_use]
    pub fn subscription(&self) -> SubscriptionState {
        self.subscription
    }

    /// Networks currently known to be available.
    #[must_use]
    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    /// Mark the host subscription as registered.
    ///
    /// Returns `true` if the host should register now. A released monitor
    /// never registers again.
    pub fn register(&mut self) -> bool {
        if self.subscription != SubscriptionState::Inactive {
            return false;
        }
        self.subscription = SubscriptionState::Registered;
        debug!("connectivity subscription registered");
        true
    }

    /// Mark the host subscription as released.
    ///
    /// Returns `true` exactly once, for the call that should unregister.
    pub fn release(&mut self) -> bool {
        let was_registered = self.subscription == SubscriptionState::Registered;
        self.subscription = SubscriptionState::Released;
        if was_registered {
            debug!("connectivity subscription released");
        }
        was_registered
    }

    /// Fold a host callback into the monitor.
    ///
    /// Returns a transition only when the device's online state flips.
    pub fn observe(&mut self, signal: ConnectivitySignal) -> Option<ConnectivityTransition> {
        if self.subscription != SubscriptionState::Registered {
            debug!(?signal, subscription = ?self.subscription, "ignoring connectivity signal");
            return None;
        }

        match signal {
            ConnectivitySignal::Available(id) => {
                self.networks.insert(id);
            },
            ConnectivitySignal::Lost(id) => {
                self.networks.remove(&id);
            },
        }

        let online = !self.networks.is_empty();
        if online == self.online {
            return None;
        }

        self.online = online;
        let transition =
            if online { ConnectivityTransition::Available } else { ConnectivityTransition::Lost };
        debug!(?transition, networks = self.networks.len(), "connectivity changed");
        Some(transition)
    }
}
