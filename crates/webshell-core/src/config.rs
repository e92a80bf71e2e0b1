//! Shell configuration.
//!
//! Supplied once by the project generator and read-only for the lifetime of
//! the shell. Loaded from TOML or built in code:
//!
//! ```toml
//! app_name = "Field Notes"
//! package_id = "com.example.fieldnotes"
//! remote_url = "https://notes.example.com/"
//! platform = "android"
//! tier = 34
//!
//! [timings]
//! grace_delay_ms = 5000
//! ```

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{CapabilityTier, ConfigError, HostPlatform, Permission};

/// Delay between boot and the permission batch.
pub const DEFAULT_GRACE_DELAY: Duration = Duration::from_secs(5);

/// Window in which a second back-press exits.
pub const DEFAULT_EXIT_WINDOW: Duration = Duration::from_secs(2);

/// Splash fade-out duration.
pub const DEFAULT_SPLASH_FADE: Duration = Duration::from_millis(400);

/// Interval at which the runtime advances timers when idle.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Timer settings, in milliseconds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellTimings {
    /// Delay between boot and the permission batch.
    pub grace_delay_ms: u64,
    /// Window in which a second back-press exits.
    pub exit_window_ms: u64,
    /// Splash fade-out duration.
    pub splash_fade_ms: u64,
    /// Runtime tick interval.
    pub tick_ms: u64,
}

impl Default for ShellTimings {
    fn default() -> Self {
        Self {
            grace_delay_ms: millis(DEFAULT_GRACE_DELAY),
            exit_window_ms: millis(DEFAULT_EXIT_WINDOW),
            splash_fade_ms: millis(DEFAULT_SPLASH_FADE),
            tick_ms: millis(DEFAULT_TICK_INTERVAL),
        }
    }
}

impl ShellTimings {
    /// Grace delay before the permission batch.
    #[must_use]
    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }

    /// Exit guard window.
    #[must_use]
    pub fn exit_window(&self) -> Duration {
        Duration::from_millis(self.exit_window_ms)
    }

    /// Splash fade duration.
    #[must_use]
    pub fn splash_fade(&self) -> Duration {
        Duration::from_millis(self.splash_fade_ms)
    }

    /// Runtime tick interval.
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Generator-supplied shell configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    /// Display name.
    pub app_name: String,
    /// Package (Android) or bundle (iOS) identifier.
    pub package_id: String,
    /// Remote application entry point.
    pub remote_url: String,
    /// Local fallback document. Defaults per host platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,
    /// Launcher icon source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    /// Splash image source. The splash overlay only exists when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splash_path: Option<String>,
    /// Restricted CPU architecture list. Empty means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub architectures: Vec<String>,
    /// Declared permissions.
    #[serde(default = "Permission::default_declared")]
    pub permissions: Vec<Permission>,
    /// Host platform.
    #[serde(default)]
    pub platform: HostPlatform,
    /// Host capability tier. Defaults per host platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<CapabilityTier>,
    /// Timer settings.
    #[serde(default)]
    pub timings: ShellTimings,
}

impl ShellConfig {
    /// Minimal configuration for a platform, with defaults elsewhere.
    pub fn new(
        app_name: impl Into<String>,
        package_id: impl Into<String>,
        remote_url: impl Into<String>,
        platform: HostPlatform,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            package_id: package_id.into(),
            remote_url: remote_url.into(),
            fallback_url: None,
            icon_path: None,
            splash_path: None,
            architectures: Vec::new(),
            permissions: Permission::default_declared(),
            platform,
            tier: None,
            timings: ShellTimings::default(),
        }
    }

    /// Set the local fallback document.
    #[must_use]
    pub fn with_fallback_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = Some(url.into());
        self
    }

    /// Set the splash image, enabling the splash overlay.
    #[must_use]
    pub fn with_splash(mut self, path: impl Into<String>) -> Self {
        self.splash_path = Some(path.into());
        self
    }

    /// Set the host capability tier.
    #[must_use]
    pub fn with_tier(mut self, tier: CapabilityTier) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Replace the declared permissions.
    #[must_use]
    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Replace the timer settings.
    #[must_use]
    pub fn with_timings(mut self, timings: ShellTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Parse and validate TOML text.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Parse` if the text does not match the schema
    /// - Any error from [`ShellConfig::validate`]
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Unreadable` if the file cannot be read
    /// - Any error from [`ShellConfig::from_toml`]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text)
    }

    /// Serialize back to TOML.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Parse` if serialization fails
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check field contents.
    ///
    /// # Errors
    ///
    /// - `ConfigError::EmptyField` for an empty name or package id
    /// - `ConfigError::InvalidRemoteUrl` unless the remote URL is http(s)
    /// - `ConfigError::FallbackNotLocal` if the fallback is outside the
    ///   local asset root
    /// - `ConfigError::ZeroTiming` for a zero exit window or tick
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::EmptyField("app_name"));
        }
        if self.package_id.trim().is_empty() {
            return Err(ConfigError::EmptyField("package_id"));
        }
        if !is_web_url(&self.remote_url) {
            return Err(ConfigError::InvalidRemoteUrl(self.remote_url.clone()));
        }

        let root = self.platform.local_root();
        let fallback = self.fallback_url();
        let names_document =
            Url::parse(fallback).is_ok_and(|url| !url.path().ends_with('/'));
        if !is_under_root(root, fallback) || !names_document {
            return Err(ConfigError::FallbackNotLocal { url: fallback.to_string(), root });
        }

        if self.timings.exit_window_ms == 0 {
            return Err(ConfigError::ZeroTiming("exit_window_ms"));
        }
        if self.timings.tick_ms == 0 {
            return Err(ConfigError::ZeroTiming("tick_ms"));
        }
        Ok(())
    }

    /// Local fallback document, configured or the platform default.
    #[must_use]
    pub fn fallback_url(&self) -> &str {
        self.fallback_url.as_deref().unwrap_or_else(|| self.platform.default_fallback_url())
    }

    /// Host capability tier, configured or the platform default.
    #[must_use]
    pub fn tier(&self) -> CapabilityTier {
        self.tier.unwrap_or_else(|| self.platform.default_tier())
    }

    /// Whether the splash overlay is shown at boot.
    #[must_use]
    pub fn has_splash(&self) -> bool {
        self.splash_path.is_some()
    }
}

/// Whether `url` is an absolute http(s) URL with a host part.
pub fn is_web_url(url: &str) -> bool {
    Url::parse(url)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
}

/// Whether `url` lies under the asset root `root`.
///
/// Scheme and host compare after parsing, so case differences in either do
/// not matter. The path must extend the root's path.
pub fn is_under_root(root: &str, url: &str) -> bool {
    let (Ok(root), Ok(url)) = (Url::parse(root), Url::parse(url)) else {
        return false;
    };
    url.scheme() == root.scheme()
        && url.host_str() == root.host_str()
        && url.port() == root.port()
        && url.path().starts_with(root.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ShellConfig {
        ShellConfig::new("Notes", "com.example.notes", "https://notes.example.com/", HostPlatform::Android)
    }

    #[test]
    fn defaults_follow_platform() {
        let android = base();
        assert_eq!(android.fallback_url(), "file:///android_asset/www/index.html");
        assert_eq!(android.tier(), CapabilityTier(34));

        let ios = ShellConfig { platform: HostPlatform::Ios, ..base() };
        assert_eq!(ios.fallback_url(), "app://local/www/index.html");
        assert!(ios.validate().is_ok());
    }

    #[test]
    fn parse_minimal_toml() {
        let config = ShellConfig::from_toml(
            r#"
            app_name = "Notes"
            package_id = "com.example.notes"
            remote_url = "https://notes.example.com/"
            tier = 30

            [timings]
            exit_window_ms = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.tier(), CapabilityTier(30));
        assert_eq!(config.timings.exit_window(), Duration::from_millis(1500));
        assert_eq!(config.timings.grace_delay(), DEFAULT_GRACE_DELAY);
        assert_eq!(config.permissions, Permission::default_declared());
    }

    #[test]
    fn parse_permission_names() {
        let config = ShellConfig::from_toml(
            r#"
            app_name = "Notes"
            package_id = "com.example.notes"
            remote_url = "https://notes.example.com/"
            permissions = ["camera", "fine-location", "background-location"]
            "#,
        )
        .unwrap();
        assert_eq!(config.permissions, vec![
            Permission::Camera,
            Permission::FineLocation,
            Permission::BackgroundLocation
        ]);
    }

    #[test]
    fn unknown_field_rejected() {
        let err = ShellConfig::from_toml(
            r#"
            app_name = "Notes"
            package_id = "com.example.notes"
            remote_url = "https://notes.example.com/"
            colour = "red"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn remote_url_must_be_web() {
        let config = ShellConfig { remote_url: "ftp://example.com".into(), ..base() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRemoteUrl(_))));

        let config = ShellConfig { remote_url: "https://".into(), ..base() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRemoteUrl(_))));
    }

    #[test]
    fn web_urls_are_parsed_not_prefix_matched() {
        assert!(is_web_url("HTTPS://app.example.com/"));
        assert!(is_web_url("http://localhost:8080/path?q=1"));
        assert!(!is_web_url("https://:443/"));
        assert!(!is_web_url("https://"));
        assert!(!is_web_url("mailto:someone@example.com"));
        assert!(!is_web_url("file:///android_asset/www/index.html"));
        assert!(!is_web_url("not a url"));
    }

    #[test]
    fn asset_root_compares_parsed_parts() {
        let root = "file:///android_asset/";
        assert!(is_under_root(root, "file:///android_asset/www/about.html"));
        assert!(is_under_root(root, "FILE:///android_asset/www/index.html"));
        assert!(!is_under_root(root, "file:///android_assets/www/index.html"));
        assert!(!is_under_root(root, "https://example.com/android_asset/"));

        assert!(is_under_root("app://local/", "app://local/www/index.html"));
        assert!(!is_under_root("app://local/", "app://remote/www/index.html"));
    }

    #[test]
    fn fallback_must_name_a_document() {
        let config = base().with_fallback_url("file:///android_asset/www/");
        assert!(matches!(config.validate(), Err(ConfigError::FallbackNotLocal { .. })));
    }

    #[test]
    fn fallback_must_be_local() {
        let config = base().with_fallback_url("https://example.com/offline.html");
        assert_eq!(config.validate(), Err(ConfigError::FallbackNotLocal {
            url: "https://example.com/offline.html".into(),
            root: "file:///android_asset/",
        }));
    }

    #[test]
    fn empty_name_rejected() {
        let config = ShellConfig { app_name: "  ".into(), ..base() };
        assert_eq!(config.validate(), Err(ConfigError::EmptyField("app_name")));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShellConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn toml_round_trip() {
        let config = base().with_splash("splash.png").with_tier(CapabilityTier(33));
        let text = config.to_toml().unwrap();
        assert_eq!(ShellConfig::from_toml(&text).unwrap(), config);
    }
}
