//! Time abstraction for deterministic testing.
//!
//! The state machines never read a clock. Drivers read one through this trait
//! and pass the instant in, so production runs on the monotonic system clock
//! while simulations run on a virtual clock they advance explicitly.

use std::time::Duration;

/// Abstract environment providing time and the one async primitive a driver
/// loop needs.
///
/// # Invariants
///
/// - `now()` never goes backwards
pub trait Environment: Clone + Send + Sync + 'static {
    /// Instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`, simulations use a
    /// virtual instant.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver and runtime code awaits this, never the state machines.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
