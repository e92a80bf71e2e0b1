//! Fuzz target for CapabilityCall::decode
//!
//! Feeds arbitrary text to the bridge decoder to find:
//! - Panics on malformed JSON or argument shapes
//! - Calls that decode but do not survive re-encoding
//!
//! The decoder should NEVER panic. Hostile input must return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use webshell_proto::{CapabilityCall, Capability};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(call) = CapabilityCall::decode(raw) {
        let capability = call.capability();
        assert_eq!(Capability::from_wire(capability.wire_name()), Some(capability));

        // The canonical envelope decodes to the same call.
        let canonical = call.to_envelope().to_json();
        let again = CapabilityCall::decode(&canonical).expect("canonical envelope must decode");
        assert_eq!(again, call);
    }
});
