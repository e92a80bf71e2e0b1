//! Seeded connectivity chaos.
//!
//! Generates long, reproducible operation streams dominated by reachability
//! flapping interleaved with page lifecycle events, back gestures, file
//! chooser traffic and bridge calls. The same seed always yields the same
//! stream, so a failing run is replayed by its seed alone.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, warn};
use webshell_proto::Capability;

use crate::{
    InvariantRegistry, ShellWorld,
    invariants::ActionCounters,
    operation::{BiometricResult, BridgeCall, NETWORK_SLOTS, Operation, Page},
};

/// Probability that a step is a reachability signal.
pub const DEFAULT_FLAP_PROBABILITY: f64 = 0.4;

/// Outcome of a chaos run.
#[derive(Debug, Clone, Serialize)]
pub struct ChaosReport {
    /// Seed the stream was generated from.
    pub seed: u64,
    /// Operations applied before the run ended.
    pub steps: usize,
    /// Action counters at the end of the run.
    pub counters: ActionCounters,
    /// Final navigation state.
    pub final_state: String,
    /// Invariant violations that stopped the run. Empty on success.
    pub violations: Vec<String>,
}

impl ChaosReport {
    /// Whether every invariant held for the whole run.
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Seeded operation generator.
#[derive(Debug, Clone)]
pub struct ConnectivityChaos {
    seed: u64,
    rng: ChaCha8Rng,
    flap_probability: f64,
    calls: Vec<u8>,
}

impl ConnectivityChaos {
    /// Create a generator for `seed`.
    pub fn new(seed: u64) -> Self {
        // Closing the app ends a run early; chaos keeps it alive.
        let calls = (0..Capability::ALL.len() as u8)
            .filter(|i| BridgeCall { capability: *i, arg: 0 }.capability() != Capability::CloseApp)
            .collect();
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            flap_probability: DEFAULT_FLAP_PROBABILITY,
            calls,
        }
    }

    /// Override how often a step is a reachability signal.
    #[must_use]
    pub fn with_flap_probability(mut self, probability: f64) -> Self {
        self.flap_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Seed of this generator.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Next operation in the stream.
    pub fn next_operation(&mut self) -> Operation {
        if self.rng.gen_bool(self.flap_probability) {
            let slot = self.rng.gen_range(0..NETWORK_SLOTS);
            return if self.rng.gen_bool(0.5) {
                Operation::NetworkUp(slot)
            } else {
                Operation::NetworkDown(slot)
            };
        }

        match self.rng.gen_range(0..12) {
            0 | 1 => Operation::PageStarted(self.page()),
            2 | 3 => Operation::PageFinished(self.page()),
            4 => Operation::LoadFailed { page: self.page(), main_frame: self.rng.gen_bool(0.7) },
            5 => Operation::Intercept(self.page()),
            6 => Operation::Back { can_go_back: self.rng.gen_bool(0.8) },
            7 => Operation::Advance { millis: self.rng.gen_range(50..3_000) },
            8 => self.file_operation(),
            9 => self.permission_operation(),
            10 => {
                let capability = self.calls[self.rng.gen_range(0..self.calls.len())];
                Operation::Invoke(BridgeCall { capability, arg: self.rng.r#gen() })
            },
            _ => Operation::SetReachable(self.rng.gen_bool(0.5)),
        }
    }

    /// The next `count` operations.
    pub fn operations(&mut self, count: usize) -> Vec<Operation> {
        (0..count).map(|_| self.next_operation()).collect()
    }

    /// Apply `steps` operations to `world`, checking `registry` after each.
    ///
    /// Stops at the first violation.
    pub fn run(
        &mut self,
        world: &mut ShellWorld,
        steps: usize,
        registry: &InvariantRegistry,
    ) -> ChaosReport {
        let mut applied = 0;
        let mut violations = Vec::new();

        for step in 0..steps {
            let op = self.next_operation();
            world.apply(&op);
            applied = step + 1;

            if let Err(found) = registry.check_all(&world.snapshot()) {
                warn!(seed = self.seed, step, ?op, "invariant violated");
                violations = found.iter().map(|v| format!("step {step} ({op:?}): {v}")).collect();
                break;
            }
        }

        debug!(seed = self.seed, steps = applied, "chaos run finished");
        ChaosReport {
            seed: self.seed,
            steps: applied,
            counters: world.counters(),
            final_state: format!("{:?}", world.shell().navigator().state()),
            violations,
        }
    }

    fn page(&mut self) -> Page {
        match self.rng.gen_range(0..6) {
            0 | 1 => Page::Remote(self.rng.gen_range(0..4)),
            2 => Page::ThirdParty(self.rng.gen_range(0..2)),
            3 => Page::Bundled(self.rng.gen_range(0..2)),
            _ => Page::Fallback,
        }
    }

    fn file_operation(&mut self) -> Operation {
        let request = self.rng.gen_range(0..4);
        match self.rng.gen_range(0..3) {
            0 => Operation::OpenFile(request),
            1 => Operation::FileLaunchFailed(request),
            _ => Operation::CompleteFile { request, selected: self.rng.gen_bool(0.5) },
        }
    }

    fn permission_operation(&mut self) -> Operation {
        match self.rng.gen_range(0..5) {
            0 => Operation::PermissionBatch { granted: true },
            1 => Operation::PermissionBatch { granted: false },
            2 => Operation::PermissionDismissed,
            3 => Operation::FollowUp { granted: self.rng.gen_bool(0.5) },
            _ => Operation::Biometric(match self.rng.gen_range(0..3) {
                0 => BiometricResult::Succeeded,
                1 => BiometricResult::Rejected,
                _ => BiometricResult::Error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use webshell_core::HostPlatform;

    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let a = ConnectivityChaos::new(7).operations(200);
        let b = ConnectivityChaos::new(7).operations(200);
        assert_eq!(a, b);
        assert_ne!(a, ConnectivityChaos::new(8).operations(200));
    }

    #[test]
    fn stream_never_closes_the_app() {
        let ops = ConnectivityChaos::new(3).operations(2_000);
        assert!(!ops.iter().any(|op| matches!(
            op,
            Operation::Shutdown
        ) || matches!(op, Operation::Invoke(call) if call.capability() == Capability::CloseApp)));
    }

    #[test]
    fn flapping_run_keeps_invariants() {
        let registry = InvariantRegistry::standard();
        for seed in 0..8 {
            let mut world = ShellWorld::new(ShellWorld::sample_config(HostPlatform::Android));
            world.boot(seed % 2 == 0);
            let report = ConnectivityChaos::new(seed).run(&mut world, 500, &registry);
            assert!(report.passed(), "{:?}", report.violations);
            assert_eq!(report.steps, 500);
        }
    }
}
