//! Property-based tests for the shell state machine.
//!
//! Tests verify that invariants hold under arbitrary operation sequences.
//! This ensures behavioral correctness across all possible execution paths.

use arbitrary::{Arbitrary, Unstructured};
use proptest::prelude::*;
use webshell_app::ShellAction;
use webshell_core::{HostPlatform, NavigationState};
use webshell_harness::{
    InvariantRegistry, Operation, ShellWorld,
    operation::{BiometricResult, BridgeCall, Page},
};

fn page_strategy() -> impl Strategy<Value = Page> {
    prop_oneof![
        3 => (0u8..4).prop_map(Page::Remote),
        1 => (0u8..2).prop_map(Page::ThirdParty),
        2 => Just(Page::Fallback),
        1 => (0u8..2).prop_map(Page::Bundled),
    ]
}

/// Generate random shell operations.
fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => (0u8..3).prop_map(Operation::NetworkUp),
        4 => (0u8..3).prop_map(Operation::NetworkDown),
        1 => any::<bool>().prop_map(Operation::SetReachable),
        3 => page_strategy().prop_map(Operation::PageStarted),
        3 => page_strategy().prop_map(Operation::PageFinished),
        1 => (page_strategy(), any::<bool>())
            .prop_map(|(page, main_frame)| Operation::LoadFailed { page, main_frame }),
        1 => page_strategy().prop_map(Operation::Intercept),
        2 => any::<bool>().prop_map(|can_go_back| Operation::Back { can_go_back }),
        1 => (0u8..4).prop_map(Operation::OpenFile),
        1 => (0u8..4).prop_map(Operation::FileLaunchFailed),
        1 => (0u8..4, any::<bool>())
            .prop_map(|(request, selected)| Operation::CompleteFile { request, selected }),
        1 => any::<bool>().prop_map(|granted| Operation::PermissionBatch { granted }),
        1 => Just(Operation::PermissionDismissed),
        1 => any::<bool>().prop_map(|granted| Operation::FollowUp { granted }),
        1 => prop_oneof![
            Just(BiometricResult::Succeeded),
            Just(BiometricResult::Rejected),
            Just(BiometricResult::Error),
        ]
        .prop_map(Operation::Biometric),
        1 => any::<u8>().prop_map(Operation::WebPermission),
        2 => (any::<u8>(), any::<u16>())
            .prop_map(|(capability, arg)| Operation::Invoke(BridgeCall { capability, arg })),
        1 => Just(Operation::SplashFaded),
        2 => (0u16..3_000).prop_map(|millis| Operation::Advance { millis }),
    ]
}

fn platform_strategy() -> impl Strategy<Value = HostPlatform> {
    prop_oneof![Just(HostPlatform::Android), Just(HostPlatform::Ios)]
}

proptest! {
    /// Shell invariants hold under arbitrary operation sequences.
    #[test]
    fn prop_invariants_hold(
        platform in platform_strategy(),
        reachable in any::<bool>(),
        ops in prop::collection::vec(operation_strategy(), 0..200),
    ) {
        let registry = InvariantRegistry::standard();
        let mut world = ShellWorld::new(ShellWorld::sample_config(platform));
        world.boot(reachable);
        world.check(&registry, "after boot");

        for (i, op) in ops.iter().enumerate() {
            world.apply(op);
            world.check(&registry, &format!("after op {i}: {op:?}"));
        }
    }

    /// Teardown mid-session leaves nothing behind, whatever came before.
    #[test]
    fn prop_teardown_is_final(
        ops in prop::collection::vec(operation_strategy(), 0..100),
        after in prop::collection::vec(operation_strategy(), 0..50),
    ) {
        let registry = InvariantRegistry::standard();
        let mut world = ShellWorld::new(ShellWorld::sample_config(HostPlatform::Android));
        world.boot(true);
        for op in &ops {
            world.apply(op);
        }

        world.apply(&Operation::Shutdown);
        let emitted = world.actions().len();
        for op in &after {
            world.apply(op);
        }

        world.check(&registry, "after teardown");
        prop_assert_eq!(world.actions().len(), emitted, "actions emitted after teardown");
        prop_assert!(world.shell().files().pending().is_none());
    }

    /// Raw fuzz-style byte streams decode into operations that keep the
    /// invariants too.
    #[test]
    fn prop_arbitrary_operations(bytes in prop::collection::vec(any::<u8>(), 0..2048)) {
        let registry = InvariantRegistry::standard();
        let mut u = Unstructured::new(&bytes);
        let Ok(ops) = Vec::<Operation>::arbitrary(&mut u) else {
            return Ok(());
        };

        let mut world = ShellWorld::new(ShellWorld::sample_config(HostPlatform::Android));
        world.boot(true);
        for op in &ops {
            world.apply(op);
        }
        world.check(&registry, "after arbitrary operations");
    }

    /// The most recent debounced connectivity event decides whether remote
    /// content can be ready.
    #[test]
    fn prop_never_ready_after_lost(
        ops in prop::collection::vec(operation_strategy(), 0..150),
    ) {
        let mut world = ShellWorld::new(ShellWorld::sample_config(HostPlatform::Android));
        world.boot(true);
        for op in &ops {
            world.apply(op);
            if !world.shell().connectivity().is_online() {
                prop_assert_ne!(world.shell().navigator().state(), NavigationState::ContentReady);
            }
        }
    }

    /// Every file-chooser request is resolved exactly once.
    #[test]
    fn prop_file_requests_resolved_once(
        ops in prop::collection::vec(operation_strategy(), 0..150),
    ) {
        let mut world = ShellWorld::new(ShellWorld::sample_config(HostPlatform::Android));
        world.boot(true);
        let mut opened = 0;
        for op in &ops {
            if matches!(op, Operation::OpenFile(_)) && !world.shell().is_finishing() {
                opened += 1;
            }
            world.apply(op);
        }
        world.apply(&Operation::Shutdown);

        let resolved = world
            .actions()
            .iter()
            .filter(|a| matches!(a, ShellAction::ResolveFileRequest { .. }))
            .count();
        prop_assert_eq!(resolved, opened);
    }
}
