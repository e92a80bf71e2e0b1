//! Operations for model-based testing.
//!
//! Operations represent everything a host and its embedded content can do to
//! a running shell. They are generated randomly by proptest or the fuzzer and
//! applied to a [`crate::ShellWorld`].

use arbitrary::Arbitrary;
use webshell_proto::{Capability, CapabilityCall, NotificationArgs};

/// Network identifier slot (folded onto a handful of interfaces so up and
/// down signals collide often).
pub type NetworkSlot = u8;

/// Number of distinct simulated network interfaces.
pub const NETWORK_SLOTS: u8 = 3;

/// A document the surface can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Page {
    /// A page of the configured remote application.
    Remote(u8),
    /// A page on some other origin the user navigated to.
    ThirdParty(u8),
    /// The bundled fallback document.
    Fallback,
    /// Another page of the bundled mirror, next to the fallback document.
    Bundled(u8),
}

impl Page {
    /// URL of the page given the shell's remote origin and fallback document.
    pub fn url(self, remote_origin: &str, fallback: &str) -> String {
        match self {
            Self::Remote(n) => format!("{}/page/{n}", remote_origin.trim_end_matches('/')),
            Self::ThirdParty(n) => format!("https://thirdparty.example.org/{n}"),
            Self::Fallback => fallback.to_string(),
            Self::Bundled(n) => match fallback.rsplit_once('/') {
                Some((dir, _)) => format!("{dir}/page{n}.html"),
                None => format!("{fallback}/page{n}.html"),
            },
        }
    }
}

/// A bridge call embedded content might make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct BridgeCall {
    /// Index into [`Capability::ALL`], folded.
    pub capability: u8,
    /// Raw argument material, interpreted per argument shape.
    pub arg: u16,
}

impl BridgeCall {
    /// Capability this call addresses.
    pub fn capability(self) -> Capability {
        Capability::ALL[usize::from(self.capability) % Capability::ALL.len()]
    }

    /// The typed call with an argument of the right shape.
    pub fn to_call(self) -> CapabilityCall {
        let flag = self.arg % 2 == 0;
        match self.capability() {
            Capability::Vibrate => CapabilityCall::Vibrate { duration_ms: u64::from(self.arg) },
            Capability::BiometricLogin => CapabilityCall::BiometricLogin,
            Capability::ClipboardCopy => {
                CapabilityCall::ClipboardCopy { text: format!("clip-{}", self.arg) }
            },
            Capability::DeviceInfo => CapabilityCall::DeviceInfo,
            Capability::BatteryLevel => CapabilityCall::BatteryLevel,
            Capability::IsCharging => CapabilityCall::IsCharging,
            Capability::IsPowerSave => CapabilityCall::IsPowerSave,
            Capability::Torch => CapabilityCall::Torch { on: flag },
            Capability::Bluetooth => CapabilityCall::Bluetooth { enable: flag },
            Capability::Notify => CapabilityCall::Notify(NotificationArgs {
                title: "Update".into(),
                message: format!("message {}", self.arg),
            }),
            Capability::CloseApp => CapabilityCall::CloseApp,
            Capability::Reload => CapabilityCall::Reload,
            Capability::ClearCache => CapabilityCall::ClearCache,
            Capability::EnableSecureScreen => CapabilityCall::EnableSecureScreen,
            Capability::DisableSecureScreen => CapabilityCall::DisableSecureScreen,
            Capability::KeepScreenOn => CapabilityCall::KeepScreenOn { on: flag },
            Capability::PackageName => CapabilityCall::PackageName,
            Capability::OpenExternalBrowser => {
                let url = if flag {
                    format!("https://docs.example.com/{}", self.arg)
                } else {
                    format!("intent://scan/{}", self.arg)
                };
                CapabilityCall::OpenExternalBrowser { url }
            },
            Capability::StartNfcScan => CapabilityCall::StartNfcScan,
            Capability::StopNfcScan => CapabilityCall::StopNfcScan,
        }
    }

    /// Wire form of the call.
    pub fn to_json(self) -> String {
        self.to_call().to_envelope().to_json()
    }
}

/// Outcome of a biometric prompt, as generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum BiometricResult {
    /// Identity confirmed.
    Succeeded,
    /// Attempt rejected.
    Rejected,
    /// Prompt errored out.
    Error,
}

/// Operations that can be applied to a shell.
///
/// Operations are designed to be small and composable so proptest can
/// explore interesting combinations of lifecycle races.
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// A network interface became usable.
    NetworkUp(NetworkSlot),

    /// A network interface went away.
    NetworkDown(NetworkSlot),

    /// Change what the live reachability probe reports.
    SetReachable(bool),

    /// The surface started loading a page.
    PageStarted(Page),

    /// The surface finished rendering a page.
    PageFinished(Page),

    /// A request for a page failed.
    LoadFailed {
        /// The failing page.
        page: Page,
        /// Whether it was the primary document.
        main_frame: bool,
    },

    /// Content tried to navigate to a page.
    Intercept(Page),

    /// Back gesture.
    Back {
        /// Whether the surface has history.
        can_go_back: bool,
    },

    /// Content opened a file input.
    OpenFile(u8),

    /// The file picker could not be launched.
    FileLaunchFailed(u8),

    /// The file picker returned.
    CompleteFile {
        /// Callback id.
        request: u8,
        /// Whether the user picked something.
        selected: bool,
    },

    /// The permission dialog answered every requested permission the same.
    PermissionBatch {
        /// Whether everything was granted.
        granted: bool,
    },

    /// The permission dialog was dismissed without answers.
    PermissionDismissed,

    /// The follow-up permission dialog answered.
    FollowUp {
        /// Whether it was granted.
        granted: bool,
    },

    /// The biometric prompt reported.
    Biometric(BiometricResult),

    /// Content asked for camera and location access.
    WebPermission(u8),

    /// Content invoked a bridge capability.
    Invoke(BridgeCall),

    /// Content posted an arbitrary message on the bridge.
    InvokeRaw(String),

    /// The splash fade finished.
    SplashFaded,

    /// Advance simulated time and tick.
    Advance {
        /// Milliseconds to advance.
        millis: u16,
    },

    /// Host teardown.
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_capability_reachable_from_index() {
        for (index, capability) in Capability::ALL.iter().enumerate() {
            let call = BridgeCall { capability: index as u8, arg: 7 };
            assert_eq!(call.to_call().capability(), *capability);
        }
    }

    #[test]
    fn generated_calls_decode() {
        for index in 0..=u8::MAX {
            let call = BridgeCall { capability: index, arg: 3 };
            assert_eq!(CapabilityCall::decode(&call.to_json()), Ok(call.to_call()));
        }
    }

    #[test]
    fn page_urls() {
        let fallback = "file:///android_asset/www/index.html";
        assert_eq!(
            Page::Remote(2).url("https://app.example.com/", fallback),
            "https://app.example.com/page/2"
        );
        assert_eq!(Page::Fallback.url("https://app.example.com", fallback), fallback);
        assert_eq!(
            Page::Bundled(1).url("https://app.example.com", fallback),
            "file:///android_asset/www/page1.html"
        );
    }
}
