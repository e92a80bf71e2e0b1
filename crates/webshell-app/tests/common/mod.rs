//! Shared fixtures for the shell integration tests.

use std::time::Duration;

use webshell_app::{Device, DeviceError, DeviceInfo};

/// Device with every piece of hardware present.
pub struct NullDevice;

impl Device for NullDevice {
    fn has_vibrator(&self) -> bool {
        true
    }

    fn vibrate(&mut self, _duration: Duration) -> Result<(), DeviceError> {
        Ok(())
    }

    fn biometric_ready(&self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn copy_to_clipboard(&mut self, _text: &str) -> Result<(), DeviceError> {
        Ok(())
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            manufacturer: "Acme".into(),
            model: "Tab".into(),
            os_name: "Android".into(),
            os_version: "14".into(),
        }
    }

    fn battery_level(&self) -> Result<u8, DeviceError> {
        Ok(50)
    }

    fn is_charging(&self) -> Result<bool, DeviceError> {
        Ok(false)
    }

    fn is_power_save(&self) -> Result<bool, DeviceError> {
        Ok(false)
    }

    fn set_torch(&mut self, _on: bool) -> Result<(), DeviceError> {
        Ok(())
    }

    fn bluetooth_enabled(&self) -> Result<bool, DeviceError> {
        Ok(true)
    }

    fn request_bluetooth_enable(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn create_notification_channel(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn post_notification(&mut self, _id: u32, _title: &str, _message: &str) -> Result<(), DeviceError> {
        Ok(())
    }

    fn open_external(&mut self, _url: &str) -> Result<(), DeviceError> {
        Ok(())
    }
}
