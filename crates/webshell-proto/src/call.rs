//! Bridge call envelope and typed capability calls.
//!
//! Embedded content posts one JSON message per call:
//!
//! ```text
//! {"name": "vibrate", "arg": 250}
//! {"name": "notification", "arg": {"title": "Hi", "message": "Done"}}
//! {"name": "close"}
//! ```
//!
//! [`CallEnvelope`] is the untyped wire form. [`CapabilityCall`] is the decoded
//! form with its argument checked against the capability's [`ArgShape`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    ArgShape, Capability,
    error::{ProtocolError, Result},
};

/// Untyped call as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEnvelope {
    /// Capability wire name.
    pub name: String,
    /// At most one JSON argument. Absent and `null` are equivalent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<Value>,
}

impl CallEnvelope {
    /// Parse a raw JSON message.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MalformedMessage` if the text is not a call envelope
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ProtocolError::MalformedMessage(e.to_string()))
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> String {
        // Serializing a String and a Value cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Argument object of the `notification` capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationArgs {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub message: String,
}

/// A decoded, argument-checked capability call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityCall {
    /// Vibrate for `duration_ms` milliseconds.
    Vibrate {
        /// Duration in milliseconds.
        duration_ms: u64,
    },
    /// Start a biometric prompt.
    BiometricLogin,
    /// Copy text to the clipboard.
    ClipboardCopy {
        /// Text to copy.
        text: String,
    },
    /// Query device identity.
    DeviceInfo,
    /// Query battery charge.
    BatteryLevel,
    /// Query charging state.
    IsCharging,
    /// Query power-save mode.
    IsPowerSave,
    /// Switch the torch.
    Torch {
        /// Desired torch state.
        on: bool,
    },
    /// Bluetooth enable request (or a disable instruction).
    Bluetooth {
        /// Requested adapter state.
        enable: bool,
    },
    /// Post a notification.
    Notify(NotificationArgs),
    /// Terminate the app.
    CloseApp,
    /// Reload the current document.
    Reload,
    /// Clear the content cache.
    ClearCache,
    /// Enable screenshot protection.
    EnableSecureScreen,
    /// Disable screenshot protection.
    DisableSecureScreen,
    /// Keep the display awake or release it.
    KeepScreenOn {
        /// Whether the display should stay on.
        on: bool,
    },
    /// Query the package or bundle identifier.
    PackageName,
    /// Open a URL in the system browser.
    OpenExternalBrowser {
        /// Target URL.
        url: String,
    },
    /// Start an NFC scan.
    StartNfcScan,
    /// Stop an NFC scan.
    StopNfcScan,
}

impl CapabilityCall {
    /// Decode a raw JSON message into a typed call.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MalformedMessage` if the text is not a call envelope
    /// - `ProtocolError::UnknownCapability` if the name is not recognised
    /// - `ProtocolError::InvalidArgument` if the argument has the wrong shape
    pub fn decode(raw: &str) -> Result<Self> {
        Self::from_envelope(&CallEnvelope::parse(raw)?)
    }

    /// Decode an already-parsed envelope.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UnknownCapability` if the name is not recognised
    /// - `ProtocolError::InvalidArgument` if the argument has the wrong shape
    pub fn from_envelope(envelope: &CallEnvelope) -> Result<Self> {
        let capability = Capability::from_wire(&envelope.name)
            .ok_or_else(|| ProtocolError::UnknownCapability(envelope.name.clone()))?;
        let arg = envelope.arg.as_ref().filter(|v| !v.is_null());
        let invalid = || ProtocolError::InvalidArgument {
            capability: capability.wire_name(),
            expected: capability.arg_shape(),
        };

        let call = match capability {
            Capability::Vibrate => {
                Self::Vibrate { duration_ms: arg.and_then(as_duration).ok_or_else(invalid)? }
            },
            Capability::BiometricLogin => Self::BiometricLogin,
            Capability::ClipboardCopy => {
                Self::ClipboardCopy { text: arg.and_then(as_text).ok_or_else(invalid)? }
            },
            Capability::DeviceInfo => Self::DeviceInfo,
            Capability::BatteryLevel => Self::BatteryLevel,
            Capability::IsCharging => Self::IsCharging,
            Capability::IsPowerSave => Self::IsPowerSave,
            Capability::Torch => Self::Torch { on: arg.and_then(Value::as_bool).ok_or_else(invalid)? },
            Capability::Bluetooth => {
                Self::Bluetooth { enable: arg.and_then(Value::as_bool).ok_or_else(invalid)? }
            },
            Capability::Notify => {
                let value = arg.cloned().ok_or_else(invalid)?;
                Self::Notify(serde_json::from_value(value).map_err(|_| invalid())?)
            },
            Capability::CloseApp => Self::CloseApp,
            Capability::Reload => Self::Reload,
            Capability::ClearCache => Self::ClearCache,
            Capability::EnableSecureScreen => Self::EnableSecureScreen,
            Capability::DisableSecureScreen => Self::DisableSecureScreen,
            Capability::KeepScreenOn => {
                Self::KeepScreenOn { on: arg.and_then(Value::as_bool).ok_or_else(invalid)? }
            },
            Capability::PackageName => Self::PackageName,
            Capability::OpenExternalBrowser => {
                Self::OpenExternalBrowser { url: arg.and_then(as_text).ok_or_else(invalid)? }
            },
            Capability::StartNfcScan => Self::StartNfcScan,
            Capability::StopNfcScan => Self::StopNfcScan,
        };
        Ok(call)
    }

    /// Capability this call addresses.
    pub fn capability(&self) -> Capability {
        match self {
            Self::Vibrate { .. } => Capability::Vibrate,
            Self::BiometricLogin => Capability::BiometricLogin,
            Self::ClipboardCopy { .. } => Capability::ClipboardCopy,
            Self::DeviceInfo => Capability::DeviceInfo,
            Self::BatteryLevel => Capability::BatteryLevel,
            Self::IsCharging => Capability::IsCharging,
            Self::IsPowerSave => Capability::IsPowerSave,
            Self::Torch { .. } => Capability::Torch,
            Self::Bluetooth { .. } => Capability::Bluetooth,
            Self::Notify(_) => Capability::Notify,
            Self::CloseApp => Capability::CloseApp,
            Self::Reload => Capability::Reload,
            Self::ClearCache => Capability::ClearCache,
            Self::EnableSecureScreen => Capability::EnableSecureScreen,
            Self::DisableSecureScreen => Capability::DisableSecureScreen,
            Self::KeepScreenOn { .. } => Capability::KeepScreenOn,
            Self::PackageName => Capability::PackageName,
            Self::OpenExternalBrowser { .. } => Capability::OpenExternalBrowser,
            Self::StartNfcScan => Capability::StartNfcScan,
            Self::StopNfcScan => Capability::StopNfcScan,
        }
    }

    /// Encode back into the untyped wire envelope.
    pub fn to_envelope(&self) -> CallEnvelope {
        let arg = match self {
            Self::Vibrate { duration_ms } => Some(Value::from(*duration_ms)),
            Self::ClipboardCopy { text } => Some(Value::from(text.as_str())),
            Self::Torch { on } | Self::KeepScreenOn { on } => Some(Value::from(*on)),
            Self::Bluetooth { enable } => Some(Value::from(*enable)),
            Self::Notify(args) => serde_json::to_value(args).ok(),
            Self::OpenExternalBrowser { url } => Some(Value::from(url.as_str())),
            _ => None,
        };
        CallEnvelope { name: self.capability().wire_name().to_string(), arg }
    }
}

/// JS numbers arrive as floats when they carry a fraction; truncate those.
fn as_duration(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)
    })
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}
