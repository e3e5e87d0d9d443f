// ── Window presentation ──
//
// Display policy applied to a resolved site before it reaches the render
// shell, plus the background task that tracks window resizes so the next
// launch opens at the same size.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

use crate::identity::is_usable_site_url;
use crate::model::{Site, capitalize_first};
use crate::settings::{DEFAULT_TITLE, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Values substituted for missing or invalid site fields.
#[derive(Debug, Clone)]
pub struct DisplayDefaults {
    pub title: String,
    pub url: Url,
    pub size: WindowSize,
}

impl From<&Settings> for DisplayDefaults {
    fn from(settings: &Settings) -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            url: settings.fallback_url.url().clone(),
            size: WindowSize::new(settings.default_width, settings.default_height),
        }
    }
}

/// Everything the render shell needs to open one site window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub name: String,
    pub title: String,
    pub url: Url,
    pub size: WindowSize,
    pub icon_path: PathBuf,
    pub data_dir: PathBuf,
}

impl WindowSpec {
    /// Apply display policy to `site`.
    ///
    /// `icon_path` is the site's cached icon when one exists; otherwise
    /// `default_icon` is used.
    pub fn for_site(
        site: &Site,
        defaults: &DisplayDefaults,
        icon_path: Option<&Path>,
        default_icon: &Path,
        data_dir: &Path,
    ) -> Self {
        let title = if site.title.trim().is_empty() {
            defaults.title.clone()
        } else {
            capitalize_first(&site.title)
        };

        let url = if is_usable_site_url(&site.url) {
            Url::parse(&site.url).unwrap_or_else(|_| defaults.url.clone())
        } else {
            debug!(url = %site.url, "invalid site URL, using fallback");
            defaults.url.clone()
        };

        let size = WindowSize::new(
            if site.width > 0 { site.width } else { defaults.size.width },
            if site.height > 0 { site.height } else { defaults.size.height },
        );

        Self {
            name: site.name.clone(),
            title,
            url,
            size,
            icon_path: icon_path
                .filter(|p| p.is_file())
                .unwrap_or(default_icon)
                .to_owned(),
            data_dir: data_dir.to_owned(),
        }
    }
}

/// Reads the live size of the rendered window.
pub trait WindowProbe: Send + Sync {
    /// `None` once the window is gone.
    fn current_size(&self) -> Option<WindowSize>;
}

/// Periodically samples a [`WindowProbe`] and reports size changes.
#[derive(Debug)]
pub struct SizeWatcher {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl SizeWatcher {
    /// Start watching. Changes relative to `initial` arrive on the
    /// returned receiver; the channel closes when the watcher stops.
    pub fn spawn(
        probe: Arc<dyn WindowProbe>,
        initial: WindowSize,
        warmup: Duration,
        interval: Duration,
    ) -> (Self, mpsc::Receiver<WindowSize>) {
        let (tx, rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => return,
                () = tokio::time::sleep(warmup) => {}
            }

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut last = initial;

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(size) = probe.current_size() else {
                            debug!("window gone, size watcher stopping");
                            break;
                        };
                        trace!(%size, "window sampled");
                        if size != last {
                            last = size;
                            if tx.send(size).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        (Self { handle, cancel }, rx)
    }

    /// Stop sampling and wait for the task to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            debug!(error = %e, "size watcher task ended abnormally");
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
