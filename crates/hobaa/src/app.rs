// ── Launch orchestration ──
//
// Wires configuration, OS adapters and core services together for one
// process run: helper mode patches and exits; every other run resolves
// the site, possibly hands off to the helper, and otherwise opens the
// window and records its size until it closes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use hobaa_api::{HobaaClient, TransportConfig};
use hobaa_config::Config;
#[cfg(windows)]
use hobaa_core::SizeWatcher;
use hobaa_core::{
    DisplayDefaults, IconProvisioner, IdentityResolver, Invocation, LaunchDecision, Layout,
    RelaunchCoordinator, Resolution, Settings, SiteRegistry, WindowSize, WindowSpec, bootstrap,
};

use crate::error::CliError;
use crate::os::{Rcedit, SystemIntegration, install_rcedit};
use crate::resources::BundledResources;
use crate::shell::BrowserShell;
#[cfg(windows)]
use crate::shell::LiveWindow;

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The site window was shown and closed.
    Rendered,
    /// The icon helper took over.
    HandedOff,
    /// Helper mode finished patching.
    Patched,
}

pub struct App {
    exe_path: PathBuf,
    layout: Layout,
    config: Config,
    settings: Settings,
    os: Arc<SystemIntegration>,
}

impl App {
    pub fn new(exe_path: PathBuf, layout: Layout) -> Result<Self, CliError> {
        let config_path = layout.config_path();
        let config =
            hobaa_config::load_config(&config_path).map_err(|e| CliError::config(e, &config_path))?;
        let settings = config
            .to_settings()
            .map_err(|e| CliError::config(e, &config_path))?;

        Ok(Self {
            exe_path,
            layout,
            config,
            settings,
            os: Arc::new(SystemIntegration::new()),
        })
    }

    /// Base name of the running executable: the site key.
    pub fn site_name(&self) -> String {
        site_name(&self.exe_path)
    }

    pub async fn run(&self, invocation: Invocation) -> Result<RunOutcome, CliError> {
        std::fs::create_dir_all(self.layout.root())?;
        install_rcedit(&self.layout);
        let coordinator = self.coordinator();

        if let Invocation::IconPatch(request) = &invocation {
            info!(target = %request.target_exe.display(), "icon helper started");
            coordinator
                .run_patch(request)
                .await
                .map_err(|e| CliError::patch(request.target_exe.clone(), e))?;
            return Ok(RunOutcome::Patched);
        }

        self.write_default_config();
        let name = self.site_name();
        let resources = Arc::new(BundledResources::new(self.layout.exe_dir()));
        let client = HobaaClient::new(&TransportConfig::default().with_timeout(self.settings.timeout))?;
        let provisioner = IconProvisioner::new(
            self.layout.icons_dir(),
            resources.clone(),
            client.clone(),
            self.settings.remote_icons_url.clone(),
        );

        let mut registry = bootstrap(&self.layout, &provisioner, resources.as_ref()).await?;

        let resolver = IdentityResolver::new(
            self.layout.sites_path(),
            self.layout.working_sites_path(),
            self.settings.fallback_url.clone(),
            self.settings.remote_sites_url.clone(),
            client,
            provisioner,
        );
        let resolution = resolver
            .resolve(&mut registry, &name, invocation.is_forced())
            .await?;

        match coordinator.decide(&resolution) {
            LaunchDecision::HandedOff { helper_pid } => {
                debug!(helper_pid, "exiting for icon update");
                Ok(RunOutcome::HandedOff)
            }
            LaunchDecision::Render => {
                self.render(&resolution, &mut registry).await?;
                Ok(RunOutcome::Rendered)
            }
        }
    }

    /// Drop an editable `config.toml` on first run.
    fn write_default_config(&self) {
        let path = self.layout.config_path();
        if path.exists() {
            return;
        }
        match hobaa_config::save_config(&Config::default(), &path) {
            Ok(()) => debug!(path = %path.display(), "default config written"),
            Err(e) => warn!(path = %path.display(), error = %e, "default config not written"),
        }
    }

    fn coordinator(&self) -> RelaunchCoordinator {
        let editor = Rcedit::locate(self.config.rcedit.as_deref(), &self.layout);
        RelaunchCoordinator::new(
            &self.exe_path,
            self.layout.helper_exe(),
            self.os.clone(),
            Arc::new(editor),
            self.settings.parent_exit_timeout,
        )
    }

    /// Open the window and, where the shell reports live sizes, persist
    /// size changes until it closes.
    async fn render(
        &self,
        resolution: &Resolution,
        registry: &mut SiteRegistry,
    ) -> Result<(), CliError> {
        let site = &resolution.site;
        let spec = WindowSpec::for_site(
            site,
            &DisplayDefaults::from(&self.settings),
            resolution.icon.as_ref().map(|icon| icon.path.as_path()),
            &self.layout.default_icon_path(),
            &self.layout.webview_dir(&site.name),
        );
        std::fs::create_dir_all(&spec.data_dir)?;

        #[cfg(windows)]
        match self.render_native(&spec, registry).await {
            Err(CliError::Window { message }) => {
                warn!(%message, "native window unavailable, opening in browser");
            }
            other => return other,
        }
        #[cfg(not(windows))]
        let _ = registry;

        self.render_in_browser(&spec).await
    }

    #[cfg(windows)]
    async fn render_native(
        &self,
        spec: &WindowSpec,
        registry: &mut SiteRegistry,
    ) -> Result<(), CliError> {
        let live = Arc::new(LiveWindow::new(spec.size));
        let (watcher, mut sizes) = SizeWatcher::spawn(
            live.clone(),
            spec.size,
            self.settings.watch_warmup,
            self.settings.watch_interval,
        );

        let window = {
            let spec = spec.clone();
            let live = live.clone();
            tokio::task::spawn_blocking(move || crate::webview::show(&spec, live))
        };
        tokio::pin!(window);

        let shown = loop {
            tokio::select! {
                joined = &mut window => break joined,
                Some(size) = sizes.recv() => self.record_size(registry, &spec.name, size),
            }
        };
        live.closed();
        watcher.stop().await;

        let shown = shown.map_err(|e| CliError::Window {
            message: e.to_string(),
        })?;
        shown?;
        debug!("site window closed");
        Ok(())
    }

    async fn render_in_browser(&self, spec: &WindowSpec) -> Result<(), CliError> {
        let shell =
            BrowserShell::locate(self.config.browser.as_deref()).ok_or_else(|| CliError::NoBrowser {
                config: self.layout.config_path().display().to_string(),
            })?;
        let mut child = shell.launch(spec)?;
        let status = child.wait().await?;
        debug!(%status, "browser window closed");
        Ok(())
    }

    #[cfg_attr(not(windows), allow(dead_code))]
    fn record_size(&self, registry: &mut SiteRegistry, name: &str, size: WindowSize) {
        if !registry.record_size(name, size.width, size.height) {
            return;
        }
        debug!(%size, "window resized");
        if let Err(e) = registry.save(&self.layout.sites_path()) {
            warn!(error = %e, "window size not saved");
        }
    }
}

/// File stem of `exe_path`, case preserved.
pub fn site_name(exe_path: &Path) -> String {
    exe_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
