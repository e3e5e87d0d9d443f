// ── Process invocation record ──
//
// The parsed launch intent of one process instance. It is also the
// message the original process hands to the icon-patch helper: the
// record is serialized onto the helper's command line with `to_args()`
// and parsed back by the binary's flag parser.

use std::ffi::OsString;
use std::path::PathBuf;

pub const FORCE_FLAG: &str = "--force";
pub const CHANGE_ICON_FLAG: &str = "--change-icon";
pub const TARGET_EXE_FLAG: &str = "--target-exe";
pub const ICON_PATH_FLAG: &str = "--icon-path";
pub const PARENT_PID_FLAG: &str = "--parent-pid";

/// What this process instance was started to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Resolve the site, synchronize the icon if needed, render.
    Normal,
    /// Trust the existing record for this name and render directly.
    Forced,
    /// Rewrite another executable's icon resource, then relaunch it.
    IconPatch(PatchRequest),
}

/// Parameters of an icon-patch helper run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRequest {
    /// The original executable whose icon resource gets rewritten.
    pub target_exe: PathBuf,
    /// The `.ico` file to bake in.
    pub icon_path: PathBuf,
    /// Process that must have exited before the target is opened for writing.
    pub parent_pid: Option<u32>,
}

impl Invocation {
    pub fn is_forced(&self) -> bool {
        matches!(self, Self::Forced)
    }

    /// Command-line arguments that reproduce this invocation.
    pub fn to_args(&self) -> Vec<OsString> {
        match self {
            Self::Normal => Vec::new(),
            Self::Forced => vec![FORCE_FLAG.into()],
            Self::IconPatch(request) => {
                let mut args: Vec<OsString> = vec![
                    CHANGE_ICON_FLAG.into(),
                    TARGET_EXE_FLAG.into(),
                    request.target_exe.clone().into_os_string(),
                    ICON_PATH_FLAG.into(),
                    request.icon_path.clone().into_os_string(),
                ];
                if let Some(pid) = request.parent_pid {
                    args.push(PARENT_PID_FLAG.into());
                    args.push(pid.to_string().into());
                }
                args
            }
        }
    }
}
