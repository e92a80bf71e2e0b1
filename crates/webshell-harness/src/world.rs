//! Synchronous simulation world.
//!
//! `ShellWorld` owns a [`Shell`] on a virtual clock together with simulated
//! hardware, and applies [`Operation`]s to it the way a host would: events
//! through [`Shell::handle`], bridge messages through [`Shell::invoke`],
//! content navigations through [`Shell::should_intercept`]. Every emitted
//! action is logged and folded into [`ActionCounters`] for invariant checks.

use std::time::Duration;

use tracing::trace;
use webshell_app::{BiometricOutcome, Shell, ShellAction, ShellEvent};
use webshell_core::{
    ConnectivitySignal, FileRequestId, HostPlatform, Permission, ShellConfig, WebResource,
};
use webshell_proto::BridgeReply;

use crate::{
    InvariantRegistry, SimDevice,
    invariants::{ActionCounters, ShellSnapshot},
    operation::{BiometricResult, NETWORK_SLOTS, Operation, Page},
};

/// Remote origin of [`ShellWorld::sample_config`].
pub const SAMPLE_REMOTE_URL: &str = "https://app.example.com/";

/// A shell under simulation.
#[derive(Debug)]
pub struct ShellWorld {
    shell: Shell<Duration>,
    device: SimDevice,
    now: Duration,
    reachable: bool,
    log: Vec<ShellAction>,
    counters: ActionCounters,
    replies: Vec<BridgeReply>,
    last_batch: Vec<Permission>,
}

impl ShellWorld {
    /// A configuration with a splash screen and default permissions.
    pub fn sample_config(platform: HostPlatform) -> ShellConfig {
        ShellConfig::new("Sample", "com.example.sample", SAMPLE_REMOTE_URL, platform)
            .with_splash("splash.png")
    }

    /// Create an unbooted world at time zero.
    pub fn new(config: ShellConfig) -> Self {
        Self {
            shell: Shell::new(config),
            device: SimDevice::new(),
            now: Duration::ZERO,
            reachable: true,
            log: Vec::new(),
            counters: ActionCounters::default(),
            replies: Vec::new(),
            last_batch: Vec::new(),
        }
    }

    /// Replace the simulated hardware.
    #[must_use]
    pub fn with_device(mut self, device: SimDevice) -> Self {
        self.device = device;
        self
    }

    /// Boot with the given reachability probe result.
    pub fn boot(&mut self, reachable: bool) -> Vec<ShellAction> {
        self.reachable = reachable;
        let finishing = self.shell.is_finishing();
        let actions = self.shell.boot(self.now, reachable);
        self.emit(actions, finishing)
    }

    /// Apply one operation and return the actions it produced.
    pub fn apply(&mut self, op: &Operation) -> Vec<ShellAction> {
        trace!(?op, "applying");
        let finishing = self.shell.is_finishing();
        let actions = match op {
            Operation::NetworkUp(slot) => {
                self.event(ShellEvent::Connectivity(ConnectivitySignal::Available(network(*slot))))
            },
            Operation::NetworkDown(slot) => {
                self.event(ShellEvent::Connectivity(ConnectivitySignal::Lost(network(*slot))))
            },
            Operation::SetReachable(reachable) => {
                self.reachable = *reachable;
                Vec::new()
            },
            Operation::PageStarted(page) => {
                let url = self.url(*page);
                self.event(ShellEvent::PageStarted { url })
            },
            Operation::PageFinished(page) => {
                let url = self.url(*page);
                self.event(ShellEvent::PageFinished { url })
            },
            Operation::LoadFailed { page, main_frame } => {
                let url = self.url(*page);
                self.event(ShellEvent::LoadFailed { url, main_frame: *main_frame })
            },
            Operation::Intercept(page) => {
                let url = self.url(*page);
                self.shell.should_intercept(&url, self.reachable).1
            },
            Operation::Back { can_go_back } => {
                self.event(ShellEvent::BackPressed { can_go_back: *can_go_back })
            },
            Operation::OpenFile(request) => {
                self.event(ShellEvent::FileChooserRequested { request: file(*request) })
            },
            Operation::FileLaunchFailed(request) => {
                self.event(ShellEvent::FileChooserLaunchFailed { request: file(*request) })
            },
            Operation::CompleteFile { request, selected } => {
                let files = selected.then(|| vec![format!("content://picked/{request}")]);
                self.event(ShellEvent::FileChooserCompleted { request: file(*request), files })
            },
            Operation::PermissionBatch { granted } => {
                let results = self.last_batch.iter().map(|p| (*p, *granted)).collect();
                self.event(ShellEvent::PermissionResults { results })
            },
            Operation::PermissionDismissed => {
                self.event(ShellEvent::PermissionResults { results: Vec::new() })
            },
            Operation::FollowUp { granted } => {
                self.event(ShellEvent::FollowUpPermissionResult { granted: *granted })
            },
            Operation::Biometric(result) => {
                let outcome = match result {
                    BiometricResult::Succeeded => BiometricOutcome::Succeeded,
                    BiometricResult::Rejected => BiometricOutcome::Rejected,
                    BiometricResult::Error => BiometricOutcome::Error("cancelled".into()),
                };
                self.event(ShellEvent::Biometric(outcome))
            },
            Operation::WebPermission(request) => self.event(ShellEvent::WebPermissionRequest {
                request: u64::from(*request),
                resources: vec![WebResource::VideoCapture, WebResource::Geolocation],
            }),
            Operation::Invoke(call) => self.invoke(&call.to_json()),
            Operation::InvokeRaw(raw) => self.invoke(raw),
            Operation::SplashFaded => self.event(ShellEvent::SplashFaded),
            Operation::Advance { millis } => self.advance(Duration::from_millis(u64::from(*millis))),
            Operation::Shutdown => self.shell.shutdown(),
        };
        self.emit(actions, finishing)
    }

    /// Move the clock forward and deliver one timer tick.
    pub fn advance(&mut self, by: Duration) -> Vec<ShellAction> {
        self.now += by;
        self.event(ShellEvent::Tick)
    }

    /// Send a raw bridge message; the reply is kept in [`ShellWorld::replies`].
    pub fn invoke(&mut self, raw: &str) -> Vec<ShellAction> {
        let (reply, actions) = self.shell.invoke(raw, &mut self.device);
        self.replies.push(reply);
        actions
    }

    /// The shell under simulation.
    pub fn shell(&self) -> &Shell<Duration> {
        &self.shell
    }

    /// The simulated hardware.
    pub fn device(&self) -> &SimDevice {
        &self.device
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Every action emitted so far.
    pub fn actions(&self) -> &[ShellAction] {
        &self.log
    }

    /// Bridge replies in call order.
    pub fn replies(&self) -> &[BridgeReply] {
        &self.replies
    }

    /// Running action counters.
    pub fn counters(&self) -> ActionCounters {
        self.counters
    }

    /// Observable state for invariant checks.
    pub fn snapshot(&self) -> ShellSnapshot {
        ShellSnapshot::from_shell(&self.shell).with_counters(self.counters)
    }

    /// Assert every invariant in `registry` holds now.
    ///
    /// # Panics
    ///
    /// If any invariant is violated.
    pub fn check(&self, registry: &InvariantRegistry, context: &str) {
        registry.assert_all(&self.snapshot(), context);
    }

    fn event(&mut self, event: ShellEvent) -> Vec<ShellAction> {
        self.shell.handle(event, self.now)
    }

    fn url(&self, page: Page) -> String {
        let navigator = self.shell.navigator();
        page.url(&self.shell.config().remote_url, navigator.fallback_url())
    }

    fn emit(&mut self, actions: Vec<ShellAction>, finishing: bool) -> Vec<ShellAction> {
        self.counters.record(&actions, finishing);
        for action in &actions {
            if let ShellAction::RequestPermissions(batch) = action {
                self.last_batch.clone_from(batch);
            }
        }
        self.log.extend(actions.iter().cloned());
        actions
    }
}

fn network(slot: u8) -> u64 {
    u64::from(slot % NETWORK_SLOTS)
}

fn file(request: u8) -> FileRequestId {
    FileRequestId(u64::from(request))
}
