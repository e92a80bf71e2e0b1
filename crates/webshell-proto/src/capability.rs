//! Capability names exposed to embedded web content.
//!
//! The wire name of each capability is part of the contract shared by every
//! host: embedded content is the same page on Android and iOS, so a name that
//! differs between hosts is a broken call on one of them.
//!
//! # Invariants
//!
//! - Every [`Capability`] has exactly one canonical wire name, and
//!   `Capability::from_wire(c.wire_name()) == Some(c)` for all variants.
//! - Aliases are accepted on decode only. Encoding always emits the canonical
//!   name.

use std::fmt;

/// How a capability answers its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Fire-and-forget. The caller gets no value back.
    Unit,
    /// An immediate scalar (string, integer or boolean).
    Scalar,
    /// The result arrives later through the page-side callback hook.
    Callback,
}

/// Argument shape expected by a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// No argument. Any supplied argument is ignored.
    None,
    /// A non-negative integer (milliseconds for `vibrate`).
    Integer,
    /// A boolean switch.
    Boolean,
    /// A string.
    Text,
    /// An object with `title` and `message` string fields.
    Notification,
}

/// Native capability addressable from embedded content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Vibrate for a number of milliseconds.
    Vibrate,
    /// Start a biometric prompt; result is delivered through the callback hook.
    BiometricLogin,
    /// Put text on the system clipboard.
    ClipboardCopy,
    /// Describe the device (manufacturer, model, OS release).
    DeviceInfo,
    /// Battery charge in percent.
    BatteryLevel,
    /// Whether the device is charging (or full).
    IsCharging,
    /// Whether the OS power-save mode is on.
    IsPowerSave,
    /// Switch the camera torch.
    Torch,
    /// Ask the user to enable Bluetooth. Disabling is never done silently.
    Bluetooth,
    /// Post a local notification.
    Notify,
    /// Terminate the app.
    CloseApp,
    /// Reload the current document.
    Reload,
    /// Clear the content cache.
    ClearCache,
    /// Turn screenshot protection on.
    EnableSecureScreen,
    /// Turn screenshot protection off.
    DisableSecureScreen,
    /// Keep the display awake (`true`) or release it (`false`).
    KeepScreenOn,
    /// The configured package or bundle identifier.
    PackageName,
    /// Open a URL in the system browser.
    OpenExternalBrowser,
    /// Start an NFC scan session.
    StartNfcScan,
    /// Stop the NFC scan session.
    StopNfcScan,
}

impl Capability {
    /// Every capability, in shim emission order.
    pub const ALL: [Capability; 20] = [
        Capability::Vibrate,
        Capability::BiometricLogin,
        Capability::ClipboardCopy,
        Capability::DeviceInfo,
        Capability::BatteryLevel,
        Capability::IsCharging,
        Capability::IsPowerSave,
        Capability::Torch,
        Capability::Bluetooth,
        Capability::Notify,
        Capability::CloseApp,
        Capability::Reload,
        Capability::ClearCache,
        Capability::EnableSecureScreen,
        Capability::DisableSecureScreen,
        Capability::KeepScreenOn,
        Capability::PackageName,
        Capability::OpenExternalBrowser,
        Capability::StartNfcScan,
        Capability::StopNfcScan,
    ];

    /// Canonical wire name.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Vibrate => "vibrate",
            Self::BiometricLogin => "loginBiometric",
            Self::ClipboardCopy => "copyToClipboard",
            Self::DeviceInfo => "getDeviceInfo",
            Self::BatteryLevel => "getBatteryLevel",
            Self::IsCharging => "isCharging",
            Self::IsPowerSave => "isPowerSaveMode",
            Self::Torch => "flashlight",
            Self::Bluetooth => "bluetooth",
            Self::Notify => "notification",
            Self::CloseApp => "close",
            Self::Reload => "reload",
            Self::ClearCache => "clearCache",
            Self::EnableSecureScreen => "enableSecureScreen",
            Self::DisableSecureScreen => "disableSecureScreen",
            Self::KeepScreenOn => "onScreen",
            Self::PackageName => "getPackageName",
            Self::OpenExternalBrowser => "openExternalBrowser",
            Self::StartNfcScan => "startNFCScan",
            Self::StopNfcScan => "stopNFCScan",
        }
    }

    /// Resolve a wire name, accepting legacy aliases.
    pub fn from_wire(name: &str) -> Option<Self> {
        let alias = match name {
            "finishApp" => Some(Self::CloseApp),
            "getBatteryStatus" => Some(Self::BatteryLevel),
            _ => None,
        };
        alias.or_else(|| Self::ALL.into_iter().find(|c| c.wire_name() == name))
    }

    /// How this capability answers.
    pub fn reply_kind(self) -> ReplyKind {
        match self {
            Self::BiometricLogin => ReplyKind::Callback,
            Self::DeviceInfo
            | Self::BatteryLevel
            | Self::IsCharging
            | Self::IsPowerSave
            | Self::PackageName => ReplyKind::Scalar,
            _ => ReplyKind::Unit,
        }
    }

    /// Argument shape this capability expects.
    pub fn arg_shape(self) -> ArgShape {
        match self {
            Self::Vibrate => ArgShape::Integer,
            Self::Torch | Self::Bluetooth | Self::KeepScreenOn => ArgShape::Boolean,
            Self::ClipboardCopy | Self::OpenExternalBrowser => ArgShape::Text,
            Self::Notify => ArgShape::Notification,
            _ => ArgShape::None,
        }
    }

    /// Whether handling this capability touches presentation state.
    ///
    /// Such calls must run on the UI-affine context even when the invocation
    /// arrived on another thread.
    pub fn touches_presentation(self) -> bool {
        matches!(
            self,
            Self::BiometricLogin
                | Self::Bluetooth
                | Self::Torch
                | Self::CloseApp
                | Self::Reload
                | Self::ClearCache
                | Self::EnableSecureScreen
                | Self::DisableSecureScreen
                | Self::KeepScreenOn
                | Self::OpenExternalBrowser
                | Self::StartNfcScan
                | Self::StopNfcScan
        )
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
