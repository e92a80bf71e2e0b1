//! Simulated device hardware.
//!
//! `SimDevice` answers bridge calls from configurable hardware and records
//! every call that reached it, so tests can assert on the hardware side
//! effects of embedded content.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use webshell_app::{Device, DeviceError, DeviceInfo};

/// A hardware call that reached the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    /// Vibrator fired.
    Vibrate(Duration),
    /// Clipboard written.
    Clipboard(String),
    /// Torch switched.
    Torch(bool),
    /// System Bluetooth enable dialog requested.
    RequestBluetooth,
    /// Notification channel created.
    CreateChannel,
    /// Notification posted.
    Notify {
        /// Notification id.
        id: u32,
        /// Title.
        title: String,
        /// Body.
        message: String,
    },
    /// URL handed to the system browser.
    OpenExternal(String),
}

/// Configurable simulated hardware.
///
/// Clones share the call log.
#[derive(Debug, Clone)]
pub struct SimDevice {
    vibrator: bool,
    torch: bool,
    biometric: Option<DeviceError>,
    battery: u8,
    charging: bool,
    power_save: bool,
    bluetooth: Option<bool>,
    calls: Arc<Mutex<Vec<DeviceCall>>>,
}

impl Default for SimDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDevice {
    /// A fully equipped phone: vibrator, torch, enrolled biometrics and a
    /// Bluetooth adapter that is switched off.
    pub fn new() -> Self {
        Self {
            vibrator: true,
            torch: true,
            biometric: None,
            battery: 87,
            charging: false,
            power_save: false,
            bluetooth: Some(false),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Remove the vibrator.
    #[must_use]
    pub fn without_vibrator(mut self) -> Self {
        self.vibrator = false;
        self
    }

    /// Remove the torch.
    #[must_use]
    pub fn without_torch(mut self) -> Self {
        self.torch = false;
        self
    }

    /// Make biometric prompts unavailable for `reason`.
    #[must_use]
    pub fn without_biometrics(mut self, reason: DeviceError) -> Self {
        self.biometric = Some(reason);
        self
    }

    /// Bluetooth adapter state. `None` means no adapter.
    #[must_use]
    pub fn with_bluetooth(mut self, enabled: Option<bool>) -> Self {
        self.bluetooth = enabled;
        self
    }

    /// Battery state.
    #[must_use]
    pub fn with_battery(mut self, level: u8, charging: bool) -> Self {
        self.battery = level;
        self.charging = charging;
        self
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.log().clone()
    }

    /// Take and clear the recorded calls.
    pub fn take_calls(&self) -> Vec<DeviceCall> {
        std::mem::take(&mut *self.log())
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<DeviceCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: DeviceCall) {
        self.log().push(call);
    }
}

impl Device for SimDevice {
    fn has_vibrator(&self) -> bool {
        self.vibrator
    }

    fn vibrate(&mut self, duration: Duration) -> Result<(), DeviceError> {
        if !self.vibrator {
            return Err(DeviceError::Unavailable("vibrator"));
        }
        self.record(DeviceCall::Vibrate(duration));
        Ok(())
    }

    fn biometric_ready(&self) -> Result<(), DeviceError> {
        self.biometric.clone().map_or(Ok(()), Err)
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), DeviceError> {
        self.record(DeviceCall::Clipboard(text.to_string()));
        Ok(())
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            manufacturer: "Simulated".into(),
            model: "Handset".into(),
            os_name: "SimOS".into(),
            os_version: "1.0".into(),
        }
    }

    fn battery_level(&self) -> Result<u8, DeviceError> {
        Ok(self.battery)
    }

    fn is_charging(&self) -> Result<bool, DeviceError> {
        Ok(self.charging)
    }

    fn is_power_save(&self) -> Result<bool, DeviceError> {
        Ok(self.power_save)
    }

    fn set_torch(&mut self, on: bool) -> Result<(), DeviceError> {
        if !self.torch {
            return Err(DeviceError::Unavailable("torch"));
        }
        self.record(DeviceCall::Torch(on));
        Ok(())
    }

    fn bluetooth_enabled(&self) -> Result<bool, DeviceError> {
        self.bluetooth.ok_or(DeviceError::Unavailable("bluetooth"))
    }

    fn request_bluetooth_enable(&mut self) -> Result<(), DeviceError> {
        if self.bluetooth.is_none() {
            return Err(DeviceError::Unavailable("bluetooth"));
        }
        self.record(DeviceCall::RequestBluetooth);
        Ok(())
    }

    fn create_notification_channel(&mut self) -> Result<(), DeviceError> {
        self.record(DeviceCall::CreateChannel);
        Ok(())
    }

    fn post_notification(&mut self, id: u32, title: &str, message: &str) -> Result<(), DeviceError> {
        self.record(DeviceCall::Notify { id, title: title.to_string(), message: message.to_string() });
        Ok(())
    }

    fn open_external(&mut self, url: &str) -> Result<(), DeviceError> {
        self.record(DeviceCall::OpenExternal(url.to_string()));
        Ok(())
    }
}
