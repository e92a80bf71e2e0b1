//! Capability bridge dispatcher.
//!
//! Translates decoded [`CapabilityCall`]s into an immediate [`BridgeReply`]
//! plus the [`ShellAction`]s the host must perform, using a [`Device`] for
//! hardware access.
//!
//! # Responsibilities
//!
//! - Degrades capabilities whose backing permission was denied to an error
//!   reply instead of touching the hardware
//! - Creates the notification channel lazily on first use
//! - Tracks the one biometric prompt that can be open at a time and turns its
//!   outcome into a callback delivery
//!
//! Missing hardware and host failures are reported per call and never stop
//! the shell.

use std::{ops::Sub, time::Duration};

use tracing::{debug, warn};
use webshell_core::{
    Notice, Permission, PermissionSequencer, ShellConfig, config::is_web_url,
};
use webshell_proto::{BridgeReply, CallbackDelivery, Capability, CapabilityCall, NotificationArgs};

use crate::{BiometricOutcome, Device, DeviceError, ShellAction};

/// Bridge dispatch state.
#[derive(Debug, Clone)]
pub struct Bridge {
    package_id: String,
    channel_created: bool,
    next_notification_id: u32,
    biometric_in_flight: bool,
}

impl Bridge {
    /// Create a bridge answering `getPackageName` with `package_id`.
    pub fn new(package_id: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            channel_created: false,
            next_notification_id: 1,
            biometric_in_flight: false,
        }
    }

    /// Create a bridge from the shell configuration.
    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(&config.package_id)
    }

    /// Whether the notification channel exists.
    #[must_use]
    pub fn channel_created(&self) -> bool {
        self.channel_created
    }

    /// Whether a biometric prompt is open.
    #[must_use]
    pub fn biometric_in_flight(&self) -> bool {
        self.biometric_in_flight
    }

    /// Execute one call.
    ///
    /// `Reload` and `CloseApp` come back as [`ShellAction::Reload`] and
    /// [`ShellAction::Exit`]; the shell routes those through its navigation
    /// and teardown logic.
    pub fn dispatch<D, I>(
        &mut self,
        call: CapabilityCall,
        device: &mut D,
        permissions: &PermissionSequencer<I>,
    ) -> (BridgeReply, Vec<ShellAction>)
    where
        D: Device + ?Sized,
        I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
    {
        let capability = call.capability();
        debug!(%capability, ui = capability.touches_presentation(), "bridge call");

        match call {
            CapabilityCall::Vibrate { duration_ms } => {
                if !device.has_vibrator() {
                    debug!("no vibrator, ignoring");
                    return unit();
                }
                reply_unit(device.vibrate(Duration::from_millis(duration_ms)))
            },
            CapabilityCall::BiometricLogin => self.start_biometric(device),
            CapabilityCall::ClipboardCopy { text } => reply_unit(device.copy_to_clipboard(&text)),
            CapabilityCall::DeviceInfo => {
                (BridgeReply::text(device.device_info().to_string()), Vec::new())
            },
            CapabilityCall::BatteryLevel => {
                (reply_with(device.battery_level(), |l| BridgeReply::integer(i64::from(l))), Vec::new())
            },
            CapabilityCall::IsCharging => {
                (reply_with(device.is_charging(), BridgeReply::boolean), Vec::new())
            },
            CapabilityCall::IsPowerSave => {
                (reply_with(device.is_power_save(), BridgeReply::boolean), Vec::new())
            },
            CapabilityCall::Torch { on } => match device.set_torch(on) {
                Ok(()) => unit(),
                Err(e) => {
                    let reason = e.to_string();
                    (BridgeReply::error(reason.clone()), vec![ShellAction::ShowNotice(
                        Notice::TorchError(reason),
                    )])
                },
            },
            CapabilityCall::Bluetooth { enable: false } => {
                (BridgeReply::Unit, vec![ShellAction::ShowNotice(Notice::DisableBluetooth)])
            },
            CapabilityCall::Bluetooth { enable: true } => {
                if permissions.is_denied(Permission::BluetoothConnect) {
                    return denied();
                }
                match device.bluetooth_enabled() {
                    Ok(true) => unit(),
                    Ok(false) => reply_unit(device.request_bluetooth_enable()),
                    Err(e) => (BridgeReply::error(e.to_string()), Vec::new()),
                }
            },
            CapabilityCall::Notify(args) => self.notify(&args, device, permissions),
            CapabilityCall::CloseApp => (BridgeReply::Unit, vec![ShellAction::Exit]),
            CapabilityCall::Reload => (BridgeReply::Unit, vec![ShellAction::Reload]),
            CapabilityCall::ClearCache => (BridgeReply::Unit, vec![ShellAction::ClearCache]),
            CapabilityCall::EnableSecureScreen => {
                (BridgeReply::Unit, vec![ShellAction::SetSecureScreen(true)])
            },
            CapabilityCall::DisableSecureScreen => {
                (BridgeReply::Unit, vec![ShellAction::SetSecureScreen(false)])
            },
            CapabilityCall::KeepScreenOn { on } => {
                (BridgeReply::Unit, vec![ShellAction::KeepScreenOn(on)])
            },
            CapabilityCall::PackageName => (BridgeReply::text(self.package_id.clone()), Vec::new()),
            CapabilityCall::OpenExternalBrowser { url } => {
                if !is_web_url(&url) {
                    warn!(%url, "refusing to open non-web url externally");
                    return (BridgeReply::error("unsupported url"), Vec::new());
                }
                reply_unit(device.open_external(&url))
            },
            CapabilityCall::StartNfcScan => {
                (BridgeReply::Unit, vec![ShellAction::ShowNotice(Notice::NfcScanStarted)])
            },
            CapabilityCall::StopNfcScan => {
                (BridgeReply::Unit, vec![ShellAction::ShowNotice(Notice::NfcScanStopped)])
            },
        }
    }

    /// Turn a biometric prompt outcome into notices and a callback delivery.
    pub fn on_biometric(&mut self, outcome: BiometricOutcome) -> Vec<ShellAction> {
        if !self.biometric_in_flight {
            warn!(?outcome, "biometric outcome without open prompt");
            return Vec::new();
        }

        match outcome {
            BiometricOutcome::Succeeded => {
                self.biometric_in_flight = false;
                vec![
                    ShellAction::ShowNotice(Notice::LoginSuccessful),
                    deliver(&CallbackDelivery::success(Capability::BiometricLogin)),
                ]
            },
            BiometricOutcome::Rejected => {
                vec![ShellAction::ShowNotice(Notice::AuthenticationFailed)]
            },
            BiometricOutcome::Error(reason) => {
                self.biometric_in_flight = false;
                vec![
                    ShellAction::ShowNotice(Notice::AuthenticationError(reason.clone())),
                    deliver(&CallbackDelivery::failure(Capability::BiometricLogin, reason)),
                ]
            },
        }
    }

    fn start_biometric<D>(&mut self, device: &mut D) -> (BridgeReply, Vec<ShellAction>)
    where
        D: Device + ?Sized,
    {
        if self.biometric_in_flight {
            return (BridgeReply::Pending, Vec::new());
        }

        match device.biometric_ready() {
            Ok(()) => {
                self.biometric_in_flight = true;
                (BridgeReply::Pending, vec![ShellAction::PromptBiometric])
            },
            Err(e) => {
                debug!(error = %e, "biometric prompt unavailable");
                let failure = CallbackDelivery::failure(Capability::BiometricLogin, e.to_string());
                (BridgeReply::Pending, vec![deliver(&failure)])
            },
        }
    }

    fn notify<D, I>(
        &mut self,
        args: &NotificationArgs,
        device: &mut D,
        permissions: &PermissionSequencer<I>,
    ) -> (BridgeReply, Vec<ShellAction>)
    where
        D: Device + ?Sized,
        I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
    {
        if permissions.is_denied(Permission::PostNotifications) {
            return denied();
        }

        if !self.channel_created {
            if let Err(e) = device.create_notification_channel() {
                return (BridgeReply::error(e.to_string()), Vec::new());
            }
            self.channel_created = true;
        }

        let id = self.next_notification_id;
        self.next_notification_id = self.next_notification_id.wrapping_add(1).max(1);
        reply_unit(device.post_notification(id, &args.title, &args.message))
    }
}

fn unit() -> (BridgeReply, Vec<ShellAction>) {
    (BridgeReply::Unit, Vec::new())
}

fn denied() -> (BridgeReply, Vec<ShellAction>) {
    (BridgeReply::error(DeviceError::PermissionDenied.to_string()), Vec::new())
}

fn reply_unit(result: Result<(), DeviceError>) -> (BridgeReply, Vec<ShellAction>) {
    match result {
        Ok(()) => unit(),
        Err(e) => (BridgeReply::error(e.to_string()), Vec::new()),
    }
}

fn reply_with<T>(result: Result<T, DeviceError>, f: impl FnOnce(T) -> BridgeReply) -> BridgeReply {
    match result {
        Ok(value) => f(value),
        Err(e) => BridgeReply::error(e.to_string()),
    }
}

fn deliver(delivery: &CallbackDelivery) -> ShellAction {
    ShellAction::EvaluateScript(delivery.to_script())
}
