//! Host platform profiles.
//!
//! The two hosts run the same machines; what differs is where the local asset
//! bundle lives and which permissions exist at which capability tier. Those
//! differences are data, kept here, so host adapters stay thin.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Android tier that introduced runtime notification consent and granular
/// media reads.
pub const ANDROID_GRANULAR_MEDIA_TIER: CapabilityTier = CapabilityTier(33);

/// Android tier that introduced partial ("selected photos") media access.
pub const ANDROID_PARTIAL_MEDIA_TIER: CapabilityTier = CapabilityTier(34);

/// Android tier that introduced nearby-device Bluetooth permissions.
pub const ANDROID_NEARBY_DEVICES_TIER: CapabilityTier = CapabilityTier(31);

/// Android tier from which background location needs its own request.
pub const ANDROID_BACKGROUND_LOCATION_TIER: CapabilityTier = CapabilityTier(29);

/// iOS tier from which "always" location is granted in a second step.
pub const IOS_BACKGROUND_LOCATION_TIER: CapabilityTier = CapabilityTier(13);

/// Host operating-system version bracket.
///
/// Android API level or iOS major version. Only compared against thresholds
/// of the same platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityTier(pub u32);

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a permission belongs in the initial batch on a given tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierGate {
    /// Requestable on every tier.
    Always,
    /// Requestable at or above the tier.
    From(CapabilityTier),
    /// Requestable strictly below the tier.
    Below(CapabilityTier),
    /// Never part of the batch on this platform.
    Never,
}

impl TierGate {
    /// Whether the gate admits `tier`.
    #[must_use]
    pub fn admits(self, tier: CapabilityTier) -> bool {
        match self {
            Self::Always => true,
            Self::From(min) => tier >= min,
            Self::Below(limit) => tier < limit,
            Self::Never => false,
        }
    }

    /// Whether the permission is requestable regardless of tier.
    #[must_use]
    pub fn is_direct(self) -> bool {
        self == Self::Always
    }
}

/// Host platform the shell runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    /// Android WebView host.
    #[default]
    Android,
    /// iOS WKWebView host.
    Ios,
}

impl HostPlatform {
    /// URL prefix under which the bundled site is served.
    #[must_use]
    pub fn local_root(self) -> &'static str {
        match self {
            Self::Android => "file:///android_asset/",
            Self::Ios => "app://local/",
        }
    }

    /// Fallback document used when the config names none.
    #[must_use]
    pub fn default_fallback_url(self) -> &'static str {
        match self {
            Self::Android => "file:///android_asset/www/index.html",
            Self::Ios => "app://local/www/index.html",
        }
    }

    /// Tier assumed when the config names none.
    #[must_use]
    pub fn default_tier(self) -> CapabilityTier {
        match self {
            Self::Android => CapabilityTier(34),
            Self::Ios => CapabilityTier(17),
        }
    }

    /// First tier on which background location is a separate request.
    #[must_use]
    pub fn background_location_tier(self) -> CapabilityTier {
        match self {
            Self::Android => ANDROID_BACKGROUND_LOCATION_TIER,
            Self::Ios => IOS_BACKGROUND_LOCATION_TIER,
        }
    }

    /// Whether `tier` asks for background location after foreground
    /// location instead of implying it.
    #[must_use]
    pub fn separates_background_location(self, tier: CapabilityTier) -> bool {
        tier >= self.background_location_tier()
    }

    /// Batch gate for `permission`.
    ///
    /// Background location is never in the batch: it is either a follow-up or
    /// implied by foreground location.
    #[must_use]
    pub fn gate(self, permission: Permission) -> TierGate {
        use Permission as P;
        match (self, permission) {
            (_, P::BackgroundLocation) => TierGate::Never,

            (Self::Android, P::PostNotifications)
            | (Self::Android, P::ReadMediaImages)
            | (Self::Android, P::ReadMediaVideo)
            | (Self::Android, P::ReadMediaAudio) => TierGate::From(ANDROID_GRANULAR_MEDIA_TIER),
            (Self::Android, P::ReadMediaVisualUserSelected) => {
                TierGate::From(ANDROID_PARTIAL_MEDIA_TIER)
            },
            (Self::Android, P::ReadExternalStorage) | (Self::Android, P::WriteExternalStorage) => {
                TierGate::Below(ANDROID_GRANULAR_MEDIA_TIER)
            },
            (Self::Android, P::BluetoothScan) | (Self::Android, P::BluetoothConnect) => {
                TierGate::From(ANDROID_NEARBY_DEVICES_TIER)
            },
            (Self::Android, _) => TierGate::Always,

            (Self::Ios, P::CallPhone)
            | (Self::Ios, P::ReadPhoneState)
            | (Self::Ios, P::ReadSms)
            | (Self::Ios, P::ReceiveSms)
            | (Self::Ios, P::SendSms)
            | (Self::Ios, P::ReadMediaVideo)
            | (Self::Ios, P::ReadMediaVisualUserSelected)
            | (Self::Ios, P::ReadExternalStorage)
            | (Self::Ios, P::WriteExternalStorage)
            | (Self::Ios, P::WriteContacts)
            | (Self::Ios, P::BluetoothConnect) => TierGate::Never,
            (Self::Ios, _) => TierGate::Always,
        }
    }

    /// Identifier the host's permission API uses for `permission`.
    ///
    /// Android manifest names, iOS usage-description keys. Permissions the
    /// platform folds into another share its identifier.
    #[must_use]
    pub fn permission_identifier(self, permission: Permission) -> &'static str {
        use Permission as P;
        match self {
            Self::Android => match permission {
                P::Camera => "android.permission.CAMERA",
                P::RecordAudio => "android.permission.RECORD_AUDIO",
                P::ReadContacts => "android.permission.READ_CONTACTS",
                P::WriteContacts => "android.permission.WRITE_CONTACTS",
                P::CallPhone => "android.permission.CALL_PHONE",
                P::ReadPhoneState => "android.permission.READ_PHONE_STATE",
                P::ReadSms => "android.permission.READ_SMS",
                P::ReceiveSms => "android.permission.RECEIVE_SMS",
                P::SendSms => "android.permission.SEND_SMS",
                P::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
                P::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
                P::BackgroundLocation => "android.permission.ACCESS_BACKGROUND_LOCATION",
                P::PostNotifications => "android.permission.POST_NOTIFICATIONS",
                P::ReadMediaImages => "android.permission.READ_MEDIA_IMAGES",
                P::ReadMediaVideo => "android.permission.READ_MEDIA_VIDEO",
                P::ReadMediaAudio => "android.permission.READ_MEDIA_AUDIO",
                P::ReadMediaVisualUserSelected => {
                    "android.permission.READ_MEDIA_VISUAL_USER_SELECTED"
                },
                P::ReadExternalStorage => "android.permission.READ_EXTERNAL_STORAGE",
                P::WriteExternalStorage => "android.permission.WRITE_EXTERNAL_STORAGE",
                P::BluetoothScan => "android.permission.BLUETOOTH_SCAN",
                P::BluetoothConnect => "android.permission.BLUETOOTH_CONNECT",
            },
            Self::Ios => match permission {
                P::Camera => "NSCameraUsageDescription",
                P::RecordAudio => "NSMicrophoneUsageDescription",
                P::ReadContacts | P::WriteContacts => "NSContactsUsageDescription",
                P::FineLocation | P::CoarseLocation => "NSLocationWhenInUseUsageDescription",
                P::BackgroundLocation => "NSLocationAlwaysAndWhenInUseUsageDescription",
                P::PostNotifications => "UNAuthorizationOptions",
                P::ReadMediaImages | P::ReadMediaVideo | P::ReadMediaVisualUserSelected => {
                    "NSPhotoLibraryUsageDescription"
                },
                P::ReadMediaAudio => "NSAppleMusicUsageDescription",
                P::BluetoothScan | P::BluetoothConnect => "NSBluetoothAlwaysUsageDescription",
                P::CallPhone
                | P::ReadPhoneState
                | P::ReadSms
                | P::ReceiveSms
                | P::SendSms
                | P::ReadExternalStorage
                | P::WriteExternalStorage => "",
            },
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Android => f.write_str("android"),
            Self::Ios => f.write_str("ios"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn android_gates_follow_thresholds() {
        let gate = HostPlatform::Android.gate(Permission::ReadMediaImages);
        assert!(!gate.admits(CapabilityTier(32)));
        assert!(gate.admits(CapabilityTier(33)));

        let legacy = HostPlatform::Android.gate(Permission::ReadExternalStorage);
        assert!(legacy.admits(CapabilityTier(32)));
        assert!(!legacy.admits(CapabilityTier(33)));

        let partial = HostPlatform::Android.gate(Permission::ReadMediaVisualUserSelected);
        assert!(!partial.admits(CapabilityTier(33)));
        assert!(partial.admits(CapabilityTier(34)));
    }

    #[test]
    fn background_location_never_batched() {
        for platform in [HostPlatform::Android, HostPlatform::Ios] {
            assert_eq!(platform.gate(Permission::BackgroundLocation), TierGate::Never);
        }
    }

    #[test]
    fn background_split_thresholds() {
        assert!(!HostPlatform::Android.separates_background_location(CapabilityTier(28)));
        assert!(HostPlatform::Android.separates_background_location(CapabilityTier(29)));
        assert!(!HostPlatform::Ios.separates_background_location(CapabilityTier(12)));
        assert!(HostPlatform::Ios.separates_background_location(CapabilityTier(13)));
    }

    #[test]
    fn ios_has_no_telephony_permissions() {
        assert!(!HostPlatform::Ios.gate(Permission::SendSms).admits(CapabilityTier(17)));
        assert!(HostPlatform::Ios.permission_identifier(Permission::SendSms).is_empty());
    }
}
