//! Configuration for Hobaa.
//!
//! Layered settings (built-in defaults, then `<appdata>/Hobaa/config.toml`,
//! then `HOBAA_*` environment variables) and the data-directory layout,
//! translated into the types `hobaa-core` consumes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use hobaa_core::settings::{
    DEFAULT_HEIGHT, DEFAULT_WIDTH, FALLBACK_URL, REMOTE_ICONS_URL, REMOTE_SITES_URL,
};
use hobaa_core::{Layout, Settings, SiteAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Directory created under the per-user data directory.
pub const APP_DIR: &str = "Hobaa";

/// Prefix of environment overrides, e.g. `HOBAA_TIMEOUT=10`.
pub const ENV_PREFIX: &str = "HOBAA_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Everything a user can tune in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Opened when a site has no usable URL.
    pub fallback_url: String,

    /// Window size used when a site records none.
    pub default_width: u32,
    pub default_height: u32,

    /// Published site list. Empty disables remote lookups.
    pub remote_sites_url: String,

    /// Base of the remote icon catalog. Empty disables it.
    pub remote_icons_url: String,

    /// Network timeout in seconds.
    pub timeout: u64,

    /// Explicit path to `rcedit.exe`.
    pub rcedit: Option<PathBuf>,

    /// Explicit browser executable for the app-mode window.
    pub browser: Option<PathBuf>,

    pub watch_warmup_ms: u64,
    pub watch_interval_ms: u64,
    pub parent_exit_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_url: FALLBACK_URL.into(),
            default_width: DEFAULT_WIDTH,
            default_height: DEFAULT_HEIGHT,
            remote_sites_url: REMOTE_SITES_URL.into(),
            remote_icons_url: REMOTE_ICONS_URL.into(),
            timeout: 30,
            rcedit: None,
            browser: None,
            watch_warmup_ms: 1000,
            watch_interval_ms: 500,
            parent_exit_timeout_ms: 10_000,
        }
    }
}

impl Config {
    /// Validate and convert into core [`Settings`].
    pub fn to_settings(&self) -> Result<Settings, ConfigError> {
        let fallback_url = SiteAddress::parse(&self.fallback_url).ok_or_else(|| {
            validation(
                "fallback_url",
                &format!("not an http(s) URL: {}", self.fallback_url),
            )
        })?;

        if self.default_width == 0 || self.default_height == 0 {
            return Err(validation(
                "default_width/default_height",
                "window dimensions must be positive",
            ));
        }
        if self.timeout == 0 {
            return Err(validation("timeout", "must be at least one second"));
        }
        if self.watch_interval_ms == 0 {
            return Err(validation("watch_interval_ms", "must be positive"));
        }

        Ok(Settings {
            fallback_url,
            remote_sites_url: optional_url("remote_sites_url", &self.remote_sites_url)?,
            remote_icons_url: optional_url("remote_icons_url", &self.remote_icons_url)?,
            timeout: Duration::from_secs(self.timeout),
            default_width: self.default_width,
            default_height: self.default_height,
            watch_warmup: Duration::from_millis(self.watch_warmup_ms),
            watch_interval: Duration::from_millis(self.watch_interval_ms),
            parent_exit_timeout: Duration::from_millis(self.parent_exit_timeout_ms),
        })
    }

    /// Serialize to pretty TOML, as written by [`save_config`].
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn validation(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

fn parse_site_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw
        .parse()
        .map_err(|_| validation(field, &format!("invalid URL: {raw}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return Err(validation(field, &format!("not an http(s) URL: {raw}")));
    }
    Ok(url)
}

fn optional_url(field: &str, raw: &str) -> Result<Option<Url>, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_site_url(field, raw).map(Some)
}

// ── Paths ───────────────────────────────────────────────────────────

/// The per-user data root, `<appdata>/Hobaa`.
///
/// `APPDATA`, then `LOCALAPPDATA`, then the platform data directory, and
/// finally an `AppData` folder next to the executable.
pub fn appdata_root(exe_dir: &Path) -> PathBuf {
    let base = ["APPDATA", "LOCALAPPDATA"]
        .into_iter()
        .filter_map(std::env::var_os)
        .find(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| BaseDirs::new().map(|dirs| dirs.data_dir().to_path_buf()))
        .unwrap_or_else(|| exe_dir.join("AppData"));
    base.join(APP_DIR)
}

/// Layout for an executable living at `exe_path`.
pub fn layout_for(exe_path: &Path) -> Layout {
    let exe_dir = exe_path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Layout::new(appdata_root(&exe_dir), exe_dir)
}

// ── Loading / saving ────────────────────────────────────────────────

/// Build the figment for a given config file.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Load the config file at `path`, layered over defaults and the environment.
///
/// A missing file is not an error.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment(path).extract()?)
}

/// Write `config` to `path`, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, config.to_toml()?)?;
    Ok(())
}
