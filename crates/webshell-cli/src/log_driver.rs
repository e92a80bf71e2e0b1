//! Logging driver for scripted sessions.
//!
//! Wraps the simulation driver: every action is recorded for the transcript
//! and traced at `info`, reachability follows the script's network reports,
//! and bridge calls reach simulated hardware.

use webshell_app::{Driver, ShellAction};
use webshell_harness::{SimDevice, SimDriver, SimDriverError};

/// Driver that traces every action it performs.
#[derive(Debug, Clone, Default)]
pub struct LogDriver {
    inner: SimDriver,
}

impl LogDriver {
    /// Create a driver with default simulated hardware.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver over specific hardware.
    pub fn with_device(device: SimDevice) -> Self {
        Self { inner: SimDriver::with_device(device) }
    }

    /// Set what the reachability probe reports.
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.set_reachable(reachable);
    }

    /// Drain the actions performed since the last call.
    pub fn take_performed(&self) -> Vec<ShellAction> {
        self.inner.take_performed()
    }

    /// Whether the runtime released the driver.
    pub fn is_stopped(&self) -> bool {
        self.inner.is_stopped()
    }
}

impl Driver for LogDriver {
    type Error = SimDriverError;
    type Device = SimDevice;

    fn is_reachable(&mut self) -> bool {
        self.inner.is_reachable()
    }

    fn device(&mut self) -> &mut Self::Device {
        self.inner.device()
    }

    fn perform(&mut self, action: ShellAction) -> Result<(), Self::Error> {
        tracing::info!(action = %describe(&action), "host action");
        self.inner.perform(action)
    }

    fn stop(&mut self) {
        tracing::info!("host released");
        self.inner.stop();
    }
}

/// One-line human description of an action.
pub fn describe(action: &ShellAction) -> String {
    match action {
        ShellAction::LoadUrl(url) => format!("load {url}"),
        ShellAction::Reload => "reload".into(),
        ShellAction::ClearCache => "clear cache".into(),
        ShellAction::GoBack => "go back".into(),
        ShellAction::ShowNotice(notice) => format!("notice \"{notice}\""),
        ShellAction::ShowProgress => "show progress".into(),
        ShellAction::HideProgress => "hide progress".into(),
        ShellAction::FadeOutSplash { duration } => {
            format!("fade splash over {}ms", duration.as_millis())
        },
        ShellAction::RequestPermissions(batch) => {
            let names: Vec<String> = batch.iter().map(|p| format!("{p:?}")).collect();
            format!("request permissions [{}]", names.join(", "))
        },
        ShellAction::RequestFollowUpPermission(permission) => {
            format!("request follow-up permission {permission:?}")
        },
        ShellAction::LaunchFilePicker { request } => format!("launch file picker #{}", request.0),
        ShellAction::ResolveFileRequest { request, files: None } => {
            format!("resolve file request #{} with no result", request.0)
        },
        ShellAction::ResolveFileRequest { request, files: Some(files) } => {
            format!("resolve file request #{} with [{}]", request.0, files.join(", "))
        },
        ShellAction::PromptBiometric => "prompt biometric".into(),
        ShellAction::EvaluateScript(script) => format!("evaluate {script}"),
        ShellAction::SetSecureScreen(on) => format!("secure screen {}", on_off(*on)),
        ShellAction::KeepScreenOn(on) => format!("keep screen on {}", on_off(*on)),
        ShellAction::ResolveWebPermission { request, granted } => {
            format!("resolve web permission #{request} granting {granted:?}")
        },
        ShellAction::SubscribeConnectivity => "subscribe connectivity".into(),
        ShellAction::UnsubscribeConnectivity => "unsubscribe connectivity".into(),
        ShellAction::Exit => "exit".into(),
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
