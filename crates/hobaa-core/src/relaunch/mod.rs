//! Relaunch coordination.
//!
//! A running executable cannot rewrite its own icon resource. When the
//! resolved site's icon may differ from the baked-in one, the original
//! process copies itself to a helper, starts the helper detached with an
//! [`Invocation::IconPatch`] on its command line, and exits. The helper
//! waits for the original to go away, patches it, and starts it again
//! with `--force`, which resolves straight to a direct run.
//!
//! ```text
//!   DirectRun <─────────────── Relaunching
//!      ▲                           ▲
//!      │ no sync needed            │
//!   resolve ──> NeedsSync ──> SpawnHelper ──> HelperPatching
//! ```

mod patch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use strum::Display;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::identity::{Resolution, ResolveOutcome};
use crate::model::{Invocation, PatchRequest};
use crate::ports::{OsIntegration, ResourceEditor};

pub use patch::{backup_path, patch_executable};

/// Delay used when the helper was not told which process to wait for.
const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Liveness polling period while waiting for the parent to exit.
const PARENT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LaunchState {
    DirectRun,
    NeedsSync,
    SpawnHelper,
    HelperPatching,
    Relaunching,
    Terminal,
}

/// What the original process does after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchDecision {
    /// Open the window in this process.
    Render,
    /// A helper took over; this process exits immediately with success.
    HandedOff { helper_pid: u32 },
}

pub struct RelaunchCoordinator {
    current_exe: PathBuf,
    helper_exe: PathBuf,
    os: Arc<dyn OsIntegration>,
    editor: Arc<dyn ResourceEditor>,
    parent_exit_timeout: Duration,
}

impl RelaunchCoordinator {
    pub fn new(
        current_exe: impl Into<PathBuf>,
        helper_exe: impl Into<PathBuf>,
        os: Arc<dyn OsIntegration>,
        editor: Arc<dyn ResourceEditor>,
        parent_exit_timeout: Duration,
    ) -> Self {
        Self {
            current_exe: current_exe.into(),
            helper_exe: helper_exe.into(),
            os,
            editor,
            parent_exit_timeout,
        }
    }

    /// Decide between rendering now and handing off to the patch helper.
    ///
    /// Never fails: anything that prevents a hand-off degrades to
    /// [`LaunchDecision::Render`].
    #[tracing::instrument(skip_all, fields(site = %resolution.site.name, outcome = %resolution.outcome))]
    pub fn decide(&self, resolution: &Resolution) -> LaunchDecision {
        if resolution.outcome == ResolveOutcome::Forced {
            self.os.refresh_icon_cache();
        }

        if !resolution.requires_sync() {
            transition(LaunchState::DirectRun);
            return LaunchDecision::Render;
        }

        transition(LaunchState::NeedsSync);
        let Some(icon) = resolution.icon.as_ref() else {
            transition(LaunchState::DirectRun);
            return LaunchDecision::Render;
        };

        if !self.editor.is_available() {
            info!("no resource editor available, skipping icon sync");
            transition(LaunchState::DirectRun);
            return LaunchDecision::Render;
        }

        transition(LaunchState::SpawnHelper);
        match self.spawn_helper(&icon.path) {
            Ok(helper_pid) => {
                info!(helper_pid, "icon patch handed off");
                LaunchDecision::HandedOff { helper_pid }
            }
            Err(e) => {
                warn!(error = %e, "could not start icon helper, running directly");
                transition(LaunchState::DirectRun);
                LaunchDecision::Render
            }
        }
    }

    /// Copy this executable to the helper path (once) and start it detached.
    pub fn spawn_helper(&self, icon_path: &Path) -> Result<u32, CoreError> {
        self.ensure_helper()?;

        let request = Invocation::IconPatch(PatchRequest {
            target_exe: self.current_exe.clone(),
            icon_path: icon_path.to_owned(),
            parent_pid: Some(self.os.current_pid()),
        });
        self.os.spawn_detached(&self.helper_exe, &request.to_args())
    }

    fn ensure_helper(&self) -> Result<(), CoreError> {
        if self.helper_exe.is_file() {
            return Ok(());
        }
        if let Some(dir) = self.helper_exe.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::copy(&self.current_exe, &self.helper_exe)?;
        debug!(helper = %self.helper_exe.display(), "helper executable installed");
        Ok(())
    }

    // ── Helper side ─────────────────────────────────────────────────

    /// Patch-mode entry point: wait, patch, refresh, relaunch.
    ///
    /// The original is relaunched even when patching fails so the user
    /// still gets a window; the patch error is returned afterwards.
    #[tracing::instrument(skip_all, fields(target = %request.target_exe.display()))]
    pub async fn run_patch(&self, request: &PatchRequest) -> Result<(), CoreError> {
        transition(LaunchState::HelperPatching);
        self.wait_for_parent(request.parent_pid).await;

        let patched = patch_executable(self.editor.as_ref(), &request.target_exe, &request.icon_path);
        match &patched {
            Ok(()) => info!(icon = %request.icon_path.display(), "icon patched"),
            Err(e) => warn!(error = %e, "icon patch failed, original restored"),
        }
        self.os.refresh_icon_cache();

        transition(LaunchState::Relaunching);
        let relaunched = self
            .os
            .spawn_detached(&request.target_exe, &Invocation::Forced.to_args());
        transition(LaunchState::Terminal);

        patched?;
        relaunched.map(|pid| debug!(pid, "original relaunched"))
    }

    /// Wait until `pid` has exited or the deadline passes.
    ///
    /// Returns `true` when the parent is known to be gone.
    pub async fn wait_for_parent(&self, pid: Option<u32>) -> bool {
        let Some(pid) = pid else {
            tokio::time::sleep(SETTLE_DELAY).await;
            return true;
        };

        let deadline = Instant::now() + self.parent_exit_timeout;
        while self.os.is_process_alive(pid) {
            if Instant::now() >= deadline {
                warn!(pid, "parent still running, patching anyway");
                return false;
            }
            tokio::time::sleep(PARENT_POLL).await;
        }
        debug!(pid, "parent exited");
        true
    }
}

fn transition(state: LaunchState) {
    debug!(%state, "launch state");
}

impl std::fmt::Debug for RelaunchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaunchCoordinator")
            .field("current_exe", &self.current_exe)
            .field("helper_exe", &self.helper_exe)
            .field("parent_exit_timeout", &self.parent_exit_timeout)
            .finish_non_exhaustive()
    }
}
