//! Permission sequencer.
//!
//! Requests sensitive device access in stages once the first paint has had a
//! chance to happen:
//!
//! ```text
//! ┌──────┐ schedule ┌───────────┐ grace elapsed ┌───────────────┐
//! │ Idle │─────────>│ Scheduled │──────────────>│ BatchInFlight │
//! └──────┘          └───────────┘               └───────────────┘
//!                         │ finishing                │ results
//!                         ↓                          ├──────────────────────┐
//!                   ┌───────────┐                    ↓                      ↓
//!                   │ Cancelled │          ┌──────────────────┐ result ┌──────┐
//!                   └───────────┘          │ FollowUpInFlight │───────>│ Done │
//!                                          └──────────────────┘        └──────┘
//! ```
//!
//! # Invariants
//!
//! - The batch is issued at most once per session
//! - The background-location follow-up is issued at most once, and only after
//!   foreground location was granted on a tier that separates the two
//! - A denial is terminal: nothing moves a permission out of `Denied`

use std::{collections::BTreeMap, ops::Sub, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CapabilityTier, HostPlatform, ShellConfig};

/// A sensitive device permission the generator can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    /// Camera capture.
    Camera,
    /// Microphone capture.
    RecordAudio,
    /// Read contacts.
    ReadContacts,
    /// Write contacts.
    WriteContacts,
    /// Place calls.
    CallPhone,
    /// Read phone state.
    ReadPhoneState,
    /// Read SMS.
    ReadSms,
    /// Receive SMS.
    ReceiveSms,
    /// Send SMS.
    SendSms,
    /// Precise location.
    FineLocation,
    /// Approximate location.
    CoarseLocation,
    /// Location while the app is in the background.
    BackgroundLocation,
    /// Post notifications.
    PostNotifications,
    /// Read images from shared storage.
    ReadMediaImages,
    /// Read video from shared storage.
    ReadMediaVideo,
    /// Read audio from shared storage.
    ReadMediaAudio,
    /// Read user-selected media only.
    ReadMediaVisualUserSelected,
    /// Legacy shared-storage read.
    ReadExternalStorage,
    /// Legacy shared-storage write.
    WriteExternalStorage,
    /// Scan for nearby Bluetooth devices.
    BluetoothScan,
    /// Connect to paired Bluetooth devices.
    BluetoothConnect,
}

impl Permission {
    /// Every permission.
    pub const ALL: [Self; 21] = [
        Self::Camera,
        Self::RecordAudio,
        Self::ReadContacts,
        Self::WriteContacts,
        Self::CallPhone,
        Self::ReadPhoneState,
        Self::ReadSms,
        Self::ReceiveSms,
        Self::SendSms,
        Self::FineLocation,
        Self::CoarseLocation,
        Self::BackgroundLocation,
        Self::PostNotifications,
        Self::ReadMediaImages,
        Self::ReadMediaVideo,
        Self::ReadMediaAudio,
        Self::ReadMediaVisualUserSelected,
        Self::ReadExternalStorage,
        Self::WriteExternalStorage,
        Self::BluetoothScan,
        Self::BluetoothConnect,
    ];

    /// Permission list the generator declares when the config names none.
    pub fn default_declared() -> Vec<Self> {
        vec![
            Self::Camera,
            Self::RecordAudio,
            Self::ReadContacts,
            Self::WriteContacts,
            Self::CallPhone,
            Self::ReadPhoneState,
            Self::ReadSms,
            Self::ReceiveSms,
            Self::SendSms,
            Self::FineLocation,
            Self::CoarseLocation,
            Self::BackgroundLocation,
            Self::PostNotifications,
            Self::ReadMediaImages,
            Self::ReadMediaVideo,
            Self::ReadMediaAudio,
            Self::ReadMediaVisualUserSelected,
            Self::ReadExternalStorage,
            Self::WriteExternalStorage,
        ]
    }

    /// Foreground location (fine or coarse).
    #[must_use]
    pub fn is_foreground_location(self) -> bool {
        matches!(self, Self::FineLocation | Self::CoarseLocation)
    }

    /// Granular media read introduced with the media tier.
    #[must_use]
    pub fn is_granular_media(self) -> bool {
        matches!(
            self,
            Self::ReadMediaImages
                | Self::ReadMediaVideo
                | Self::ReadMediaAudio
                | Self::ReadMediaVisualUserSelected
        )
    }

    /// Legacy coarse storage access.
    #[must_use]
    pub fn is_legacy_storage(self) -> bool {
        matches!(self, Self::ReadExternalStorage | Self::WriteExternalStorage)
    }
}

/// Session status of one permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    /// Not asked yet.
    NotRequested,
    /// Request in flight.
    Pending,
    /// Granted by the user (or implied by another grant).
    Granted,
    /// Denied by the user. Terminal for the session.
    Denied,
    /// Not declared, or does not exist on this host and tier.
    Unsupported,
}

/// Request the host must show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionAction {
    /// Request this ordered batch in one system dialog.
    RequestBatch(Vec<Permission>),
    /// Request one dependent permission after its primary was granted.
    RequestFollowUp(Permission),
}

/// Sequencer stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerStage {
    /// Waiting for boot.
    Idle,
    /// Grace delay running.
    Scheduled,
    /// Batch issued, waiting for results.
    BatchInFlight,
    /// Follow-up issued, waiting for its result.
    FollowUpInFlight,
    /// Nothing more will be requested.
    Done,
    /// The app started finishing before the batch was issued.
    Cancelled,
}

/// Web-content resource a page may ask for through the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WebResource {
    /// Camera stream.
    VideoCapture,
    /// Microphone stream.
    AudioCapture,
    /// Geolocation API.
    Geolocation,
    /// Protected (DRM) media playback.
    ProtectedMedia,
    /// MIDI devices.
    Midi,
}

impl WebResource {
    /// OS permissions backing the resource. Empty when none is needed.
    #[must_use]
    pub fn backing_permissions(self) -> &'static [Permission] {
        match self {
            Self::VideoCapture => &[Permission::Camera],
            Self::AudioCapture => &[Permission::RecordAudio],
            Self::Geolocation => &[Permission::FineLocation, Permission::CoarseLocation],
            Self::ProtectedMedia | Self::Midi => &[],
        }
    }
}

/// Build the ordered initial batch for a host.
///
/// Directly requestable permissions come first, then the tier-gated ones that
/// the tier admits, each group in declaration order. Duplicates are dropped.
pub fn plan_batch(
    platform: HostPlatform,
    tier: CapabilityTier,
    declared: &[Permission],
) -> Vec<Permission> {
    let mut batch: Vec<Permission> = Vec::with_capacity(declared.len());
    let direct = declared.iter().filter(|p| platform.gate(**p).is_direct());
    let gated = declared.iter().filter(|p| {
        let gate = platform.gate(**p);
        !gate.is_direct() && gate.admits(tier)
    });

    for permission in direct.chain(gated) {
        if !batch.contains(permission) {
            batch.push(*permission);
        }
    }
    batch
}

/// Staged permission request state machine.
///
/// Generic over `Instant` so the grace delay runs on real or virtual time.
#[derive(Debug, Clone)]
pub struct PermissionSequencer<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    platform: HostPlatform,
    tier: CapabilityTier,
    grace: Duration,
    batch: Vec<Permission>,
    follow_up: Option<Permission>,
    scheduled_at: Option<I>,
    stage: SequencerStage,
    statuses: BTreeMap<Permission, PermissionStatus>,
}

impl<I> PermissionSequencer<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create an idle sequencer for a host.
    pub fn new(
        platform: HostPlatform,
        tier: CapabilityTier,
        declared: &[Permission],
        grace: Duration,
    ) -> Self {
        let batch = plan_batch(platform, tier, declared);
        let follow_up = (declared.contains(&Permission::BackgroundLocation)
            && platform.separates_background_location(tier))
        .then_some(Permission::BackgroundLocation);

        let mut statuses = BTreeMap::new();
        for permission in declared {
            let status = if batch.contains(permission)
                || *permission == Permission::BackgroundLocation
            {
                PermissionStatus::NotRequested
            } else {
                PermissionStatus::Unsupported
            };
            statuses.insert(*permission, status);
        }

        Self {
            platform,
            tier,
            grace,
            batch,
            follow_up,
            scheduled_at: None,
            stage: SequencerStage::Idle,
            statuses,
        }
    }

    /// Create a sequencer from the shell configuration.
    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(config.platform, config.tier(), &config.permissions, config.timings.grace_delay())
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> SequencerStage {
        self.stage
    }

    /// Ordered batch this sequencer issues.
    #[must_use]
    pub fn batch(&self) -> &[Permission] {
        &self.batch
    }

    /// Dependent permission requested after the batch, if this host needs one.
    #[must_use]
    pub fn follow_up(&self) -> Option<Permission> {
        self.follow_up
    }

    /// Host platform the plan was built for.
    #[must_use]
    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    /// Capability tier the plan was built for.
    #[must_use]
    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// Session status of `permission`.
    #[must_use]
    pub fn status(&self, permission: Permission) -> PermissionStatus {
        self.statuses.get(&permission).copied().unwrap_or(PermissionStatus::Unsupported)
    }

    /// Whether the user denied `permission` this session.
    #[must_use]
    pub fn is_denied(&self, permission: Permission) -> bool {
        self.status(permission) == PermissionStatus::Denied
    }

    /// Whether web content may use `resource`.
    ///
    /// Granted unless every backing permission was denied.
    #[must_use]
    pub fn allows(&self, resource: WebResource) -> bool {
        let backing = resource.backing_permissions();
        backing.is_empty() || !backing.iter().all(|p| self.is_denied(*p))
    }

    /// Start the grace delay.
    ///
    /// Returns `false` (and never schedules) when the app is already
    /// finishing or the sequencer has left `Idle`.
    pub fn schedule(&mut self, now: I, finishing: bool) -> bool {
        if finishing {
            if self.stage == SequencerStage::Idle {
                self.stage = SequencerStage::Cancelled;
            }
            return false;
        }
        if self.stage != SequencerStage::Idle {
            return false;
        }

        self.scheduled_at = Some(now);
        self.stage = SequencerStage::Scheduled;
        debug!(grace = ?self.grace, "permission batch scheduled");
        true
    }

    /// Time left until the batch is due. `None` unless scheduled.
    #[must_use]
    pub fn remaining(&self, now: I) -> Option<Duration> {
        if self.stage != SequencerStage::Scheduled {
            return None;
        }
        self.scheduled_at.map(|at| self.grace.saturating_sub(now - at))
    }

    /// Advance the grace timer.
    ///
    /// Issues the batch once the delay has elapsed. If the app began
    /// finishing in the meantime the request is dropped instead.
    pub fn tick(&mut self, now: I, finishing: bool) -> Option<PermissionAction> {
        if self.stage != SequencerStage::Scheduled {
            return None;
        }
        let at = self.scheduled_at?;
        if now - at < self.grace {
            return None;
        }

        if finishing {
            self.cancel();
            return None;
        }

        if self.batch.is_empty() {
            debug!("permission batch empty");
            self.stage = SequencerStage::Done;
            return None;
        }

        for permission in &self.batch {
            self.statuses.insert(*permission, PermissionStatus::Pending);
        }
        self.stage = SequencerStage::BatchInFlight;
        debug!(count = self.batch.len(), "permission batch issued");
        Some(PermissionAction::RequestBatch(self.batch.clone()))
    }

    /// Drop a request that has not been issued yet.
    pub fn cancel(&mut self) {
        if matches!(self.stage, SequencerStage::Idle | SequencerStage::Scheduled) {
            self.stage = SequencerStage::Cancelled;
            debug!("permission batch cancelled");
        }
    }

    /// Record batch results.
    ///
    /// Batch members missing from `results` count as denied (the dialog was
    /// dismissed). Returns the follow-up request when foreground location was
    /// granted and the host separates background consent.
    pub fn on_batch_result(&mut self, results: &[(Permission, bool)]) -> Option<PermissionAction> {
        if self.stage != SequencerStage::BatchInFlight {
            debug!(stage = ?self.stage, "ignoring unexpected permission batch result");
            return None;
        }

        for permission in &self.batch {
            let granted = results.iter().any(|(p, granted)| p == permission && *granted);
            let status =
                if granted { PermissionStatus::Granted } else { PermissionStatus::Denied };
            self.statuses.insert(*permission, status);
        }

        let location_granted = self
            .statuses
            .iter()
            .any(|(p, s)| p.is_foreground_location() && *s == PermissionStatus::Granted);

        if self.statuses.contains_key(&Permission::BackgroundLocation)
            && !self.platform.separates_background_location(self.tier)
        {
            // Older tiers grant background access together with foreground.
            let implied =
                if location_granted { PermissionStatus::Granted } else { PermissionStatus::Denied };
            self.statuses.insert(Permission::BackgroundLocation, implied);
        }

        match self.follow_up {
            Some(follow_up) if location_granted => {
                self.statuses.insert(follow_up, PermissionStatus::Pending);
                self.stage = SequencerStage::FollowUpInFlight;
                debug!(?follow_up, "permission follow-up issued");
                Some(PermissionAction::RequestFollowUp(follow_up))
            },
            Some(follow_up) => {
                // Without foreground location there is nothing to extend.
                self.statuses.insert(follow_up, PermissionStatus::Unsupported);
                self.stage = SequencerStage::Done;
                None
            },
            None => {
                self.stage = SequencerStage::Done;
                None
            },
        }
    }

    /// Record the follow-up result.
    pub fn on_follow_up_result(&mut self, granted: bool) {
        if self.stage != SequencerStage::FollowUpInFlight {
            debug!(stage = ?self.stage, "ignoring unexpected permission follow-up result");
            return;
        }
        if let Some(follow_up) = self.follow_up {
            let status = if granted { PermissionStatus::Granted } else { PermissionStatus::Denied };
            self.statuses.insert(follow_up, status);
        }
        self.stage = SequencerStage::Done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRACE: Duration = Duration::from_secs(5);

    fn at(secs: u64) -> Duration {
        Duration::from_secs(secs)
    }

    fn android(tier: u32) -> PermissionSequencer<Duration> {
        PermissionSequencer::new(
            HostPlatform::Android,
            CapabilityTier(tier),
            &Permission::default_declared(),
            GRACE,
        )
    }

    fn grant_all(batch: &[Permission]) -> Vec<(Permission, bool)> {
        batch.iter().map(|p| (*p, true)).collect()
    }

    #[test]
    fn direct_permissions_come_first() {
        let batch = plan_batch(
            HostPlatform::Android,
            CapabilityTier(34),
            &[Permission::PostNotifications, Permission::Camera, Permission::ReadMediaImages],
        );
        assert_eq!(batch, vec![
            Permission::Camera,
            Permission::PostNotifications,
            Permission::ReadMediaImages
        ]);
    }

    #[test]
    fn batch_waits_for_grace_delay() {
        let mut seq = android(34);
        assert!(seq.schedule(at(0), false));
        assert_eq!(seq.tick(at(4), false), None);
        assert_eq!(seq.remaining(at(4)), Some(at(1)));

        let action = seq.tick(at(5), false);
        assert!(matches!(action, Some(PermissionAction::RequestBatch(_))));
        assert_eq!(seq.tick(at(60), false), None);
    }

    #[test]
    fn never_scheduled_while_finishing() {
        let mut seq = android(34);
        assert!(!seq.schedule(at(0), true));
        assert_eq!(seq.stage(), SequencerStage::Cancelled);
        assert_eq!(seq.tick(at(10), false), None);
    }

    #[test]
    fn finishing_during_grace_drops_batch() {
        let mut seq = android(34);
        seq.schedule(at(0), false);
        assert_eq!(seq.tick(at(6), true), None);
        assert_eq!(seq.stage(), SequencerStage::Cancelled);
    }

    #[test]
    fn location_grant_triggers_single_follow_up() {
        let mut seq = android(34);
        seq.schedule(at(0), false);
        seq.tick(at(5), false);

        let follow_up = seq.on_batch_result(&grant_all(seq.batch()));
        assert_eq!(follow_up, Some(PermissionAction::RequestFollowUp(Permission::BackgroundLocation)));
        assert_eq!(seq.on_batch_result(&[]), None);

        seq.on_follow_up_result(true);
        assert_eq!(seq.status(Permission::BackgroundLocation), PermissionStatus::Granted);
        assert_eq!(seq.stage(), SequencerStage::Done);
    }

    #[test]
    fn no_follow_up_without_location() {
        let mut seq = android(34);
        seq.schedule(at(0), false);
        seq.tick(at(5), false);
        assert_eq!(seq.on_batch_result(&[(Permission::Camera, true)]), None);
        assert!(seq.is_denied(Permission::FineLocation));
    }

    #[test]
    fn no_follow_up_before_split_tier() {
        let mut seq = android(28);
        seq.schedule(at(0), false);
        seq.tick(at(5), false);
        assert_eq!(seq.on_batch_result(&grant_all(seq.batch())), None);
        assert_eq!(seq.status(Permission::BackgroundLocation), PermissionStatus::Granted);
    }

    #[test]
    fn denial_is_terminal() {
        let mut seq = android(34);
        seq.schedule(at(0), false);
        seq.tick(at(5), false);
        seq.on_batch_result(&[(Permission::FineLocation, true)]);
        seq.on_follow_up_result(false);
        assert!(seq.is_denied(Permission::Camera));

        seq.on_batch_result(&[(Permission::Camera, true)]);
        seq.on_follow_up_result(true);
        assert!(seq.is_denied(Permission::Camera));
        assert!(seq.is_denied(Permission::BackgroundLocation));
    }

    #[test]
    fn web_resources_follow_os_denials() {
        let mut seq = android(34);
        assert!(seq.allows(WebResource::VideoCapture));
        seq.schedule(at(0), false);
        seq.tick(at(5), false);
        seq.on_batch_result(&[(Permission::CoarseLocation, true)]);

        assert!(!seq.allows(WebResource::VideoCapture));
        assert!(seq.allows(WebResource::Geolocation));
        assert!(seq.allows(WebResource::ProtectedMedia));
    }

    #[test]
    fn undeclared_is_unsupported() {
        let seq = android(34);
        assert_eq!(seq.status(Permission::BluetoothScan), PermissionStatus::Unsupported);
        assert_eq!(seq.status(Permission::ReadExternalStorage), PermissionStatus::Unsupported);
        assert_eq!(seq.status(Permission::Camera), PermissionStatus::NotRequested);
    }
}
