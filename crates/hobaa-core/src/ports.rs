// ── Collaborator ports ──
//
// Operating-system and packaging concerns the core drives but does not
// implement. The binary crate supplies the real adapters; tests supply
// in-memory fakes.

use std::ffi::OsString;
use std::path::Path;

use crate::error::CoreError;
use crate::model::Site;

/// Read-only resources bundled with the executable.
pub trait ResourceProvider: Send + Sync {
    /// Bytes of the default `hobaa.ico`.
    fn default_icon(&self) -> Result<Vec<u8>, CoreError>;

    /// Bytes of a named catalog icon, `None` when the catalog lacks it.
    fn catalog_icon(&self, file: &str) -> Option<Vec<u8>>;

    /// File names of every bundled catalog icon.
    fn catalog_files(&self) -> Vec<String>;

    /// Sites shipped with the executable.
    fn seed_sites(&self) -> Vec<Site>;
}

/// Rewrites the icon resource of a PE executable.
pub trait ResourceEditor: Send + Sync {
    /// Whether the editor can run on this host at all.
    fn is_available(&self) -> bool;

    fn set_icon(&self, executable: &Path, icon: &Path) -> Result<(), CoreError>;
}

/// Process and shell services of the host OS.
pub trait OsIntegration: Send + Sync {
    /// Start `program` detached from this process, returning its pid.
    fn spawn_detached(&self, program: &Path, args: &[OsString]) -> Result<u32, CoreError>;

    fn is_process_alive(&self, pid: u32) -> bool;

    /// Ask the shell to drop cached icons. Best effort.
    fn refresh_icon_cache(&self);

    fn current_pid(&self) -> u32;
}
