//! Lifecycle properties checked after every simulated step.
//!
//! A property here must hold for every reachable shell state, whatever
//! mix of page loads, connectivity flips and user input led there.
//!
//! # Architecture
//!
//! The invariant system extracts observable state from a
//! [`webshell_app::Shell`] (plus, when driven through a
//! [`crate::ShellWorld`], counters over the actions it emitted) into a
//! [`ShellSnapshot`], then runs registered [`Invariant`] checks against it.
//! [`InvariantRegistry::assert_all`] turns a failed check into a panic
//! naming the step that broke it.
//!
//! # Usage
//!
//! ```ignore
//! let snapshot = ShellSnapshot::from_shell(&shell);
//! InvariantRegistry::standard().check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

pub use checks::{
    ConnectivityAgreement, ContentRequiresConnectivity, LastKnownIsRemote, SingleFileRequest,
    SplashDismissedOnce, TeardownIsFinal,
};
pub use snapshot::{ActionCounters, ShellSnapshot};

/// Outcome of a single property check.
pub type InvariantResult = Result<(), Violation>;

/// A property that failed, with the observed state that broke it.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Which property failed.
    pub invariant: &'static str,
    /// The observed values.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property of shell state that no event sequence may break.
pub trait Invariant: Send + Sync {
    /// Short stable name used in reports.
    fn name(&self) -> &'static str;

    /// Inspect a snapshot.
    ///
    /// # Errors
    ///
    /// A [`Violation`] when the snapshot breaks the property.
    fn check(&self, state: &ShellSnapshot) -> InvariantResult;
}

/// Ordered set of properties run against each snapshot.
/// Use [`InvariantRegistry::standard()`] for the lifecycle invariants.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard shell invariants.
    ///
    /// Includes:
    /// - [`ContentRequiresConnectivity`]: remote content never ready offline
    /// - [`ConnectivityAgreement`]: navigation sees the monitor's view
    /// - [`LastKnownIsRemote`]: the restore target is never the fallback
    /// - [`SingleFileRequest`]: at most one pending file-chooser callback
    /// - [`SplashDismissedOnce`]: the splash fades at most once
    /// - [`TeardownIsFinal`]: nothing outlives teardown
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(ContentRequiresConnectivity);
        registry.add(ConnectivityAgreement);
        registry.add(LastKnownIsRemote);
        registry.add(SingleFileRequest);
        registry.add(SplashDismissedOnce);
        registry.add(TeardownIsFinal);
        registry
    }

    /// Register another property. It runs after those already present.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Run every property against `state`.
    ///
    /// # Errors
    ///
    /// Every violated invariant, in registration order.
    pub fn check_all(&self, state: &ShellSnapshot) -> Result<(), Vec<Violation>> {
        let failed: Vec<Violation> =
            self.invariants.iter().filter_map(|property| property.check(state).err()).collect();
        if failed.is_empty() { Ok(()) } else { Err(failed) }
    }

    /// Like [`Self::check_all`], but panics with every failure listed.
    ///
    /// # Panics
    ///
    /// If any invariant is violated.
    #[allow(clippy::panic, reason = "test assertion helper")]
    pub fn assert_all(&self, state: &ShellSnapshot, context: &str) {
        if let Err(failed) = self.check_all(state) {
            let lines: Vec<String> = failed.iter().map(ToString::to_string).collect();
            panic!("shell property broken {context}:\n  {}", lines.join("\n  "));
        }
    }

    /// How many properties are registered.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
