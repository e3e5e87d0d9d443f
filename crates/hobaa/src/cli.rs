//! Command-line surface.
//!
//! Normal launches carry no arguments at all: the executable's file name
//! selects the site. The flags exist for the self-relaunch protocol and
//! for troubleshooting.

use std::path::PathBuf;

use clap::Parser;

use hobaa_core::{Invocation, PatchRequest};

use crate::error::CliError;

/// Site-specific browser launcher. Rename or copy the executable to pick
/// the site it opens (e.g. `github.exe`, `mail.google.com.exe`).
#[derive(Debug, Parser)]
#[command(name = "hobaa", version, about, long_about = None)]
pub struct Cli {
    /// Trust the stored record for this name and open it without icon sync
    #[arg(long)]
    pub force: bool,

    /// Patch the icon of another executable, then relaunch it (helper mode)
    #[arg(long)]
    pub change_icon: bool,

    /// Executable whose icon gets replaced (with --change-icon)
    #[arg(long, value_name = "PATH")]
    pub target_exe: Option<PathBuf>,

    /// Icon file to bake into the target (with --change-icon)
    #[arg(long, value_name = "PATH")]
    pub icon_path: Option<PathBuf>,

    /// Process to wait for before patching (with --change-icon)
    #[arg(long, value_name = "PID", hide = true)]
    pub parent_pid: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Validate flag combinations into an [`Invocation`].
    pub fn invocation(&self) -> Result<Invocation, CliError> {
        if self.change_icon {
            let (Some(target_exe), Some(icon_path)) = (&self.target_exe, &self.icon_path) else {
                return Err(CliError::Usage {
                    message: "--change-icon requires both --target-exe and --icon-path".into(),
                });
            };
            return Ok(Invocation::IconPatch(PatchRequest {
                target_exe: target_exe.clone(),
                icon_path: icon_path.clone(),
                parent_pid: self.parent_pid,
            }));
        }

        if self.target_exe.is_some() || self.icon_path.is_some() || self.parent_pid.is_some() {
            return Err(CliError::Usage {
                message: "--target-exe, --icon-path and --parent-pid only apply with --change-icon"
                    .into(),
            });
        }

        Ok(if self.force {
            Invocation::Forced
        } else {
            Invocation::Normal
        })
    }
}
