// ── Host OS adapters ──
//
// Real implementations of the core's process and resource-editor ports.
// Windows-only behavior is gated with `cfg`; elsewhere the adapters
// degrade to no-ops or report themselves unavailable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, warn};

use hobaa_core::{CoreError, Layout, OsIntegration, ResourceEditor};

#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Search `PATH` for an executable, trying the platform suffix too.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    let with_suffix = format!("{name}{}", std::env::consts::EXE_SUFFIX);
    std::env::split_paths(&path)
        .flat_map(|dir| [dir.join(name), dir.join(&with_suffix)])
        .find(|candidate| candidate.is_file())
}

// ── Processes ───────────────────────────────────────────────────────

pub struct SystemIntegration {
    system: Mutex<System>,
}

impl SystemIntegration {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemIntegration {
    fn default() -> Self {
        Self::new()
    }
}

impl OsIntegration for SystemIntegration {
    fn spawn_detached(&self, program: &Path, args: &[OsString]) -> Result<u32, CoreError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = program.parent() {
            cmd.current_dir(dir);
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
        }

        let child = cmd.spawn().map_err(|source| CoreError::Spawn {
            program: program.to_owned(),
            source,
        })?;
        debug!(program = %program.display(), pid = child.id(), "spawned detached");
        Ok(child.id())
    }

    fn is_process_alive(&self, pid: u32) -> bool {
        let pid = Pid::from_u32(pid);
        let Ok(mut system) = self.system.lock() else {
            return false;
        };
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        system.process(pid).is_some()
    }

    fn refresh_icon_cache(&self) {
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            match icon_cache_command().creation_flags(CREATE_NO_WINDOW).status() {
                Ok(status) if status.success() => debug!("icon cache refreshed"),
                Ok(status) => warn!(%status, "icon cache refresh failed, shell may show the old icon"),
                Err(e) => warn!(error = %e, "icon cache refresh unavailable, shell may show the old icon"),
            }
        }
    }

    fn current_pid(&self) -> u32 {
        std::process::id()
    }
}

/// Shell icon-cache refresh.
///
/// Runs `ie4uinit.exe -show` instead of broadcasting
/// `SHChangeNotify(SHCNE_ASSOCCHANGED)`, which needs `unsafe` FFI. When
/// the tool is missing or fails, Explorer keeps showing the previous icon
/// until its own cache expires; the patched file itself is unaffected.
#[cfg_attr(not(windows), allow(dead_code))]
fn icon_cache_command() -> Command {
    let mut command = Command::new("ie4uinit.exe");
    command.arg("-show");
    command
}

// ── Resource editor ─────────────────────────────────────────────────

/// `rcedit <exe> --set-icon <ico>`.
#[derive(Debug, Clone)]
pub struct Rcedit {
    program: Option<PathBuf>,
}

impl Rcedit {
    /// Find rcedit: explicit config path, the data directory, next to the
    /// executable, then `PATH`.
    pub fn locate(configured: Option<&Path>, layout: &Layout) -> Self {
        let program = configured
            .map(Path::to_path_buf)
            .filter(|p| p.is_file())
            .or_else(|| Some(layout.rcedit_path()).filter(|p| p.is_file()))
            .or_else(|| Some(layout.exe_dir().join("rcedit.exe")).filter(|p| p.is_file()))
            .or_else(|| find_on_path("rcedit"));

        match &program {
            Some(p) => debug!(rcedit = %p.display(), "resource editor located"),
            None => debug!("resource editor not found"),
        }
        Self { program }
    }
}

impl ResourceEditor for Rcedit {
    fn is_available(&self) -> bool {
        cfg!(windows) && self.program.is_some()
    }

    fn set_icon(&self, executable: &Path, icon: &Path) -> Result<(), CoreError> {
        let fail = |message: String| CoreError::ResourceEditor {
            executable: executable.to_owned(),
            message,
        };
        let program = self
            .program
            .as_deref()
            .ok_or_else(|| fail("rcedit not found".into()))?;

        let mut cmd = Command::new(program);
        cmd.arg(executable).arg("--set-icon").arg(icon);
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let output = cmd
            .output()
            .map_err(|e| fail(format!("could not run {}: {e}", program.display())))?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(fail(format!("exited with {}: {}", output.status, stderr.trim())));
        }
        if !stderr.trim().is_empty() {
            return Err(fail(stderr.trim().to_owned()));
        }
        Ok(())
    }
}

/// Copy an `rcedit.exe` shipped next to the executable into the data
/// directory, where later runs (and the helper) look first.
pub fn install_rcedit(layout: &Layout) {
    let shipped = layout.exe_dir().join("rcedit.exe");
    let target = layout.rcedit_path();
    if target.is_file() || !shipped.is_file() {
        return;
    }
    if let Err(e) = std::fs::copy(&shipped, &target) {
        warn!(error = %e, "could not copy rcedit into data directory");
    }
}
