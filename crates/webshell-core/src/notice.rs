//! User-visible transient notices.
//!
//! Notices are the only failure surface the shell shows to the user. The text
//! is fixed so both hosts display the same words.

use std::fmt;

/// A transient, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Booted without connectivity.
    NoInternet,
    /// Connectivity went away.
    ConnectionLost,
    /// Connectivity came back.
    BackOnline,
    /// A navigation was refused because the device is offline.
    NoConnection,
    /// The primary document failed to load while offline.
    WaitingForConnection,
    /// The primary document failed to load while online.
    LoadFailed,
    /// The exit guard armed.
    PressBackAgain,
    /// Bluetooth cannot be disabled programmatically.
    DisableBluetooth,
    /// Torch switch failed.
    TorchError(String),
    /// Biometric login succeeded.
    LoginSuccessful,
    /// Biometric attempt rejected; the prompt stays open.
    AuthenticationFailed,
    /// Biometric prompt ended with an error.
    AuthenticationError(String),
    /// NFC scan started.
    NfcScanStarted,
    /// NFC scan stopped.
    NfcScanStopped,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInternet => f.write_str("No Internet Connection"),
            Self::ConnectionLost => f.write_str("Connection Lost"),
            Self::BackOnline => f.write_str("Back Online"),
            Self::NoConnection => f.write_str("No Connection"),
            Self::WaitingForConnection => f.write_str("Unable to load. Waiting for connection..."),
            Self::LoadFailed => f.write_str("Unable to load page"),
            Self::PressBackAgain => f.write_str("Press back again to exit"),
            Self::DisableBluetooth => f.write_str("Please disable Bluetooth in Settings"),
            Self::TorchError(reason) => write!(f, "Flashlight Error: {reason}"),
            Self::LoginSuccessful => f.write_str("Login Successful!"),
            Self::AuthenticationFailed => f.write_str("Authentication Failed. Try again."),
            Self::AuthenticationError(reason) => write!(f, "Authentication Error: {reason}"),
            Self::NfcScanStarted => f.write_str("NFC Scanning Started..."),
            Self::NfcScanStopped => f.write_str("NFC Scanning Stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_text() {
        assert_eq!(Notice::NoInternet.to_string(), "No Internet Connection");
        assert_eq!(Notice::TorchError("busy".into()).to_string(), "Flashlight Error: busy");
        assert_eq!(
            Notice::WaitingForConnection.to_string(),
            "Unable to load. Waiting for connection..."
        );
    }
}
