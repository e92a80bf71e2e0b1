//! Fuzz target for the shell state machine
//!
//! Drives a booted shell with arbitrary operation sequences: connectivity
//! flapping, page lifecycle reports, back gestures, file chooser and
//! permission results, raw bridge traffic and teardown.
//!
//! # Invariants
//!
//! - Remote content is never ready while offline
//! - At most one file-chooser continuation is pending
//! - The splash overlay is dismissed at most once
//! - Nothing is emitted after teardown

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use webshell_core::HostPlatform;
use webshell_harness::{InvariantRegistry, Operation, ShellWorld};

#[derive(Debug, Arbitrary)]
struct Session {
    ios: bool,
    reachable: bool,
    ops: Vec<Operation>,
}

fuzz_target!(|session: Session| {
    let platform = if session.ios { HostPlatform::Ios } else { HostPlatform::Android };
    let registry = InvariantRegistry::standard();
    let mut world = ShellWorld::new(ShellWorld::sample_config(platform));
    world.boot(session.reachable);

    for (i, op) in session.ops.iter().enumerate() {
        world.apply(op);
        world.check(&registry, &format!("after op {i}: {op:?}"));
    }

    world.apply(&Operation::Shutdown);
    let emitted = world.actions().len();
    world.apply(&Operation::NetworkUp(0));
    world.apply(&Operation::Back { can_go_back: false });
    assert_eq!(world.actions().len(), emitted, "actions emitted after teardown");
    world.check(&registry, "after teardown");
});
