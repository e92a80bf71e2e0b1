//! Fuzz target for the session script parser
//!
//! Arbitrary text must either parse or fail with an error that names a line
//! inside the script. Parsed commands echo back to a script that parses to
//! the same commands.

#![no_main]

use libfuzzer_sys::fuzz_target;
use webshell_cli::script;

fuzz_target!(|text: &str| {
    match script::parse(text) {
        Ok(commands) => {
            let echoed: String = commands.iter().map(|c| format!("{c}\n")).collect();
            assert_eq!(script::parse(&echoed).ok(), Some(commands));
        }
        Err(err) => {
            assert!(err.line() >= 1 && err.line() <= text.lines().count());
        }
    }
});
