//! Hardware seam.
//!
//! The [`Device`] trait is the only place a host touches device hardware for
//! bridge calls. Calls arrive on the runtime's single execution context, so
//! implementations need no locking of their own.

use std::{fmt, time::Duration};

use thiserror::Error;

/// Per-call hardware failure. Never fatal to the shell.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The hardware does not exist on this device.
    #[error("{0} not available")]
    Unavailable(&'static str),

    /// The backing permission was denied this session.
    #[error("permission denied")]
    PermissionDenied,

    /// The host API reported a failure.
    #[error("{0}")]
    Host(String),
}

impl DeviceError {
    /// Whether the failure is missing hardware rather than a runtime error.
    pub fn is_missing_hardware(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Device identity reported by `getDeviceInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Manufacturer name.
    pub manufacturer: String,
    /// Model name.
    pub model: String,
    /// Operating system name.
    pub os_name: String,
    /// Operating system release.
    pub os_version: String,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({} {})", self.manufacturer, self.model, self.os_name, self.os_version)
    }
}

/// Result of a biometric prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiometricOutcome {
    /// Identity confirmed.
    Succeeded,
    /// Attempt rejected; the prompt stays open for another try.
    Rejected,
    /// Prompt ended without success.
    Error(String),
}

/// Device hardware used by the capability bridge.
pub trait Device: Send {
    /// Whether a vibrator exists.
    fn has_vibrator(&self) -> bool;

    /// Vibrate once.
    fn vibrate(&mut self, duration: Duration) -> Result<(), DeviceError>;

    /// Whether a biometric prompt can be shown right now.
    ///
    /// # Errors
    ///
    /// The reason the prompt cannot be shown.
    fn biometric_ready(&self) -> Result<(), DeviceError>;

    /// Put text on the clipboard.
    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), DeviceError>;

    /// Device identity.
    fn device_info(&self) -> DeviceInfo;

    /// Battery charge in percent.
    fn battery_level(&self) -> Result<u8, DeviceError>;

    /// Whether the device is charging or full.
    fn is_charging(&self) -> Result<bool, DeviceError>;

    /// Whether power-save mode is on.
    fn is_power_save(&self) -> Result<bool, DeviceError>;

    /// Switch the torch.
    fn set_torch(&mut self, on: bool) -> Result<(), DeviceError>;

    /// Whether the Bluetooth adapter is on.
    fn bluetooth_enabled(&self) -> Result<bool, DeviceError>;

    /// Ask the system to show its Bluetooth enable dialog.
    fn request_bluetooth_enable(&mut self) -> Result<(), DeviceError>;

    /// Create the notification delivery channel.
    fn create_notification_channel(&mut self) -> Result<(), DeviceError>;

    /// Post a notification on the delivery channel.
    fn post_notification(&mut self, id: u32, title: &str, message: &str) -> Result<(), DeviceError>;

    /// Hand a URL to the system browser.
    fn open_external(&mut self, url: &str) -> Result<(), DeviceError>;
}
