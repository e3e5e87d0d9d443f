// ── Runtime settings ──
//
// Tuning values for resolution, provisioning, and relaunch. Built by
// `hobaa-config` from the config file and environment and handed in;
// core never touches the config file itself.

use std::time::Duration;

use url::Url;

use crate::identity::SiteAddress;

pub const FALLBACK_URL: &str = "https://www.google.com";
pub const REMOTE_SITES_URL: &str =
    "https://raw.githubusercontent.com/kemalersin/hobaa/refs/heads/main/sites.json";
pub const REMOTE_ICONS_URL: &str =
    "https://raw.githubusercontent.com/kemalersin/hobaa/refs/heads/main/resources/icons/ico/";
pub const DEFAULT_TITLE: &str = "Hobaa";
pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Substituted for missing or invalid site URLs. Stored as written.
    pub fallback_url: SiteAddress,
    /// Well-known remote `sites.json`; `None` disables the remote tier.
    pub remote_sites_url: Option<Url>,
    /// Base URL of the remote icon catalog for `ico/<file>` references.
    pub remote_icons_url: Option<Url>,
    /// Upper bound for every network operation.
    pub timeout: Duration,
    pub default_width: u32,
    pub default_height: u32,
    /// Delay before the size watcher takes its first sample.
    pub watch_warmup: Duration,
    /// Sampling period of the size watcher.
    pub watch_interval: Duration,
    /// How long the patch helper waits for the original process to exit.
    pub parent_exit_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fallback_url: SiteAddress::parse(FALLBACK_URL).expect("valid fallback URL"),
            remote_sites_url: Url::parse(REMOTE_SITES_URL).ok(),
            remote_icons_url: Url::parse(REMOTE_ICONS_URL).ok(),
            timeout: hobaa_api::DEFAULT_TIMEOUT,
            default_width: DEFAULT_WIDTH,
            default_height: DEFAULT_HEIGHT,
            watch_warmup: Duration::from_secs(1),
            watch_interval: Duration::from_millis(500),
            parent_exit_timeout: Duration::from_secs(10),
        }
    }
}
