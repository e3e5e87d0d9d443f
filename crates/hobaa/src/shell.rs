// ── Render shells ──
//
// On Windows a site opens in its own WebView2 window (see `webview`).
// Elsewhere, or when WebView2 is unavailable, it opens in an installed
// Chromium-family browser running in app mode: a chromeless window per
// site, with its own profile directory so cookies and sessions stay
// separate between sites.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokio::process::{Child, Command};
use tracing::{debug, info};

use hobaa_core::{WindowProbe, WindowSize, WindowSpec};

use crate::error::CliError;
use crate::os::find_on_path;

#[derive(Debug, Clone)]
pub struct BrowserShell {
    program: PathBuf,
}

impl BrowserShell {
    /// Use `configured` when it exists, else the first installed browser.
    pub fn locate(configured: Option<&Path>) -> Option<Self> {
        let program = configured
            .map(Path::to_path_buf)
            .filter(|p| p.is_file())
            .or_else(|| well_known_browsers().into_iter().find(|p| p.is_file()))
            .or_else(|| PATH_BROWSERS.iter().find_map(|name| find_on_path(name)))?;
        debug!(browser = %program.display(), "browser located");
        Some(Self { program })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments that open `spec` as an app window.
    pub fn args(spec: &WindowSpec) -> Vec<String> {
        vec![
            format!("--app={}", spec.url),
            format!("--window-size={},{}", spec.size.width, spec.size.height),
            format!("--user-data-dir={}", spec.data_dir.display()),
            "--no-first-run".to_owned(),
            "--no-default-browser-check".to_owned(),
        ]
    }

    /// Start the browser window for `spec`.
    pub fn launch(&self, spec: &WindowSpec) -> Result<Child, CliError> {
        std::fs::create_dir_all(&spec.data_dir)?;
        let child = Command::new(&self.program)
            .args(Self::args(spec))
            .kill_on_drop(false)
            .spawn()
            .map_err(|source| CliError::Launch {
                program: self.program.clone(),
                source,
            })?;
        info!(
            title = %spec.title,
            url = %spec.url,
            size = %spec.size,
            icon = %spec.icon_path.display(),
            pid = ?child.id(),
            "site window opened"
        );
        Ok(child)
    }
}

const PATH_BROWSERS: [&str; 6] = [
    "msedge",
    "chrome",
    "microsoft-edge",
    "google-chrome",
    "chromium",
    "chromium-browser",
];

fn well_known_browsers() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for var in ["ProgramFiles(x86)", "ProgramFiles", "LOCALAPPDATA"] {
        let Some(base) = std::env::var_os(var).map(PathBuf::from) else {
            continue;
        };
        candidates.push(base.join(r"Microsoft\Edge\Application\msedge.exe"));
        candidates.push(base.join(r"Google\Chrome\Application\chrome.exe"));
    }
    candidates
}

/// Size of an open native window, written by its event loop and read by
/// the size watcher. Empty once the window has closed.
#[derive(Debug)]
#[cfg_attr(not(windows), allow(dead_code))]
pub struct LiveWindow {
    size: Mutex<Option<WindowSize>>,
}

#[cfg_attr(not(windows), allow(dead_code))]
impl LiveWindow {
    pub fn new(initial: WindowSize) -> Self {
        Self {
            size: Mutex::new(Some(initial)),
        }
    }

    /// Record a new client-area size. Zero sizes come from minimizing and
    /// are not real window sizes.
    pub fn resized(&self, size: WindowSize) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Ok(mut current) = self.size.lock() {
            if let Some(slot) = current.as_mut() {
                *slot = size;
            }
        }
    }

    pub fn closed(&self) {
        if let Ok(mut current) = self.size.lock() {
            *current = None;
        }
    }
}

impl WindowProbe for LiveWindow {
    fn current_size(&self) -> Option<WindowSize> {
        self.size.lock().ok().and_then(|current| *current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use hobaa_core::SizeWatcher;
    use url::Url;

    #[test]
    fn app_mode_arguments() {
        let spec = WindowSpec {
            name: "gmail".into(),
            title: "Gmail".into(),
            url: Url::parse("https://mail.google.com").unwrap(),
            size: WindowSize::new(1280, 800),
            icon_path: PathBuf::from("gmail.ico"),
            data_dir: PathBuf::from("/data/webview/gmail"),
        };
        let args = BrowserShell::args(&spec);
        assert_eq!(args[0], "--app=https://mail.google.com/");
        assert_eq!(args[1], "--window-size=1280,800");
        assert_eq!(args[2], "--user-data-dir=/data/webview/gmail");
    }

    #[test]
    fn configured_browser_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let browser = dir.path().join("browser");
        std::fs::write(&browser, "").unwrap();
        let shell = BrowserShell::locate(Some(&browser)).unwrap();
        assert_eq!(shell.program(), browser);
    }

    #[test]
    fn live_window_tracks_resizes_until_closed() {
        let live = LiveWindow::new(WindowSize::new(1920, 1080));
        assert_eq!(live.current_size(), Some(WindowSize::new(1920, 1080)));

        live.resized(WindowSize::new(1280, 720));
        assert_eq!(live.current_size(), Some(WindowSize::new(1280, 720)));

        live.resized(WindowSize::new(0, 0));
        assert_eq!(live.current_size(), Some(WindowSize::new(1280, 720)));

        live.closed();
        live.resized(WindowSize::new(800, 600));
        assert_eq!(live.current_size(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_reports_resizes_of_a_live_window() {
        let initial = WindowSize::new(1920, 1080);
        let live = Arc::new(LiveWindow::new(initial));
        let (watcher, mut sizes) = SizeWatcher::spawn(
            live.clone(),
            initial,
            Duration::from_secs(1),
            Duration::from_millis(500),
        );

        live.resized(WindowSize::new(1024, 768));
        assert_eq!(sizes.recv().await, Some(WindowSize::new(1024, 768)));

        live.closed();
        assert_eq!(sizes.recv().await, None);
        watcher.stop().await;
    }
}
