//! Property-based tests for the Shell state machine.
//!
//! Random host event sequences, interleaved with bridge traffic, are fed
//! straight into [`Shell::handle`] and [`Shell::invoke`]; the emitted actions
//! are folded into counters that must stay consistent.

mod common;

use std::time::Duration;

use common::NullDevice;
use proptest::prelude::*;
use webshell_app::{BiometricOutcome, Shell, ShellAction, ShellEvent};
use webshell_core::{
    ConnectivitySignal, FileRequestId, HostPlatform, Permission, ShellConfig, SubscriptionState,
    WebResource,
};

const REMOTE: &str = "https://app.example.com/";
const FALLBACK: &str = "file:///android_asset/www/index.html";

#[derive(Debug, Clone)]
enum Step {
    Event(ShellEvent),
    /// Answer whatever permission batch is outstanding.
    AnswerBatch(bool),
    Invoke(&'static str),
    Advance(u64),
    Shutdown,
}

fn url() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(REMOTE.to_string()),
        Just("https://app.example.com/list".to_string()),
        Just(FALLBACK.to_string()),
        Just("https://partner.example.org/".to_string()),
    ]
}

fn event() -> impl Strategy<Value = ShellEvent> {
    prop_oneof![
        2 => (0u64..3).prop_map(|n| ShellEvent::Connectivity(ConnectivitySignal::Available(n))),
        2 => (0u64..3).prop_map(|n| ShellEvent::Connectivity(ConnectivitySignal::Lost(n))),
        3 => url().prop_map(|url| ShellEvent::PageStarted { url }),
        3 => url().prop_map(|url| ShellEvent::PageFinished { url }),
        1 => (url(), any::<bool>()).prop_map(|(url, main_frame)| ShellEvent::LoadFailed { url, main_frame }),
        1 => any::<bool>().prop_map(|can_go_back| ShellEvent::BackPressed { can_go_back }),
        2 => (0u64..4).prop_map(|n| ShellEvent::FileChooserRequested { request: FileRequestId(n) }),
        1 => (0u64..4).prop_map(|n| ShellEvent::FileChooserLaunchFailed { request: FileRequestId(n) }),
        1 => (0u64..4).prop_map(|n| ShellEvent::FileChooserCompleted {
            request: FileRequestId(n),
            files: Some(vec![format!("content://picked/{n}")]),
        }),
        1 => any::<bool>().prop_map(|granted| ShellEvent::FollowUpPermissionResult { granted }),
        1 => Just(ShellEvent::Biometric(BiometricOutcome::Succeeded)),
        1 => (0u64..3).prop_map(|request| ShellEvent::WebPermissionRequest {
            request,
            resources: vec![WebResource::VideoCapture, WebResource::Geolocation],
        }),
        1 => Just(ShellEvent::SplashFaded),
        2 => Just(ShellEvent::Tick),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        12 => event().prop_map(Step::Event),
        1 => any::<bool>().prop_map(Step::AnswerBatch),
        2 => prop_oneof![
            Just(r#"{"name":"getBatteryLevel"}"#),
            Just(r#"{"name":"vibrate","arg":40}"#),
            Just(r#"{"name":"loginBiometric"}"#),
            Just(r#"{"name":"close"}"#),
            Just(r#"{"name":"openExternalBrowser","arg":"https://docs.example.org/"}"#),
            Just("{not json"),
        ]
        .prop_map(Step::Invoke),
        2 => (0u64..3_000).prop_map(Step::Advance),
        1 => Just(Step::Shutdown),
    ]
}

#[derive(Debug, Default)]
struct Counters {
    subscribes: usize,
    unsubscribes: usize,
    splash_fades: usize,
    launched: Vec<FileRequestId>,
    resolved: Vec<FileRequestId>,
    batches: usize,
}

impl Counters {
    fn fold(&mut self, actions: &[ShellAction], batch: &mut Vec<Permission>) {
        for action in actions {
            match action {
                ShellAction::SubscribeConnectivity => self.subscribes += 1,
                ShellAction::UnsubscribeConnectivity => self.unsubscribes += 1,
                ShellAction::FadeOutSplash { .. } => self.splash_fades += 1,
                ShellAction::LaunchFilePicker { request } => self.launched.push(*request),
                ShellAction::ResolveFileRequest { request, .. } => self.resolved.push(*request),
                ShellAction::RequestPermissions(permissions) => {
                    self.batches += 1;
                    batch.clone_from(permissions);
                },
                _ => {},
            }
        }
    }
}

fn config() -> ShellConfig {
    ShellConfig::new("Sample", "com.example.sample", REMOTE, HostPlatform::Android).with_splash("splash.png")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_shell_lifecycle_is_consistent(
        reachable in any::<bool>(),
        steps in prop::collection::vec(step(), 0..80),
    ) {
        let mut shell: Shell<Duration> = Shell::new(config());
        let mut device = NullDevice;
        let mut now = Duration::ZERO;
        let mut counters = Counters::default();
        let mut batch = Vec::new();

        let boot = shell.boot(now, reachable);
        counters.fold(&boot, &mut batch);

        for step in steps {
            let finishing = shell.is_finishing();
            let actions = match step {
                Step::Event(event) => shell.handle(event, now),
                Step::AnswerBatch(granted) => {
                    let results = batch.drain(..).map(|p| (p, granted)).collect();
                    shell.handle(ShellEvent::PermissionResults { results }, now)
                },
                Step::Invoke(raw) => shell.invoke(raw, &mut device).1,
                Step::Advance(ms) => {
                    now += Duration::from_millis(ms);
                    shell.handle(ShellEvent::Tick, now)
                },
                Step::Shutdown => shell.shutdown(),
            };
            if finishing {
                prop_assert!(actions.is_empty(), "actions after teardown: {:?}", actions);
            }
            counters.fold(&actions, &mut batch);

            prop_assert!(shell.files().pending_count() <= 1);
            prop_assert!(counters.unsubscribes <= 1);
            prop_assert!(counters.splash_fades <= 1);
            prop_assert!(counters.batches <= 1);
        }

        let teardown = shell.shutdown();
        counters.fold(&teardown, &mut batch);

        prop_assert_eq!(counters.subscribes, 1);
        prop_assert_eq!(counters.unsubscribes, 1);
        prop_assert_eq!(shell.connectivity().subscription(), SubscriptionState::Released);
        prop_assert_eq!(shell.files().pending(), None);
        // Every launched picker is answered exactly once.
        let mut launched = counters.launched.clone();
        let mut resolved = counters.resolved.clone();
        launched.sort_unstable();
        resolved.sort_unstable();
        prop_assert_eq!(launched, resolved);
        prop_assert!(shell.shutdown().is_empty());
    }
}
