// ── On-disk layout ──
//
// Every path Hobaa touches, derived from two roots: the per-user data
// directory (`<appdata>/Hobaa`) and the directory holding the running
// executable. Built by `hobaa-config`; core never discovers paths itself.

use std::path::{Path, PathBuf};

pub const SITES_FILE: &str = "sites.json";
pub const ICONS_DIR: &str = "icons";
pub const DEFAULT_ICON_FILE: &str = "hobaa.ico";
pub const HELPER_EXE_STEM: &str = "hobaa_icon_changer";
pub const RCEDIT_FILE: &str = "rcedit.exe";
pub const LOGS_DIR: &str = "logs";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// `<appdata>/Hobaa`
    root: PathBuf,
    /// Directory containing the running executable.
    exe_dir: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, exe_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exe_dir: exe_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exe_dir(&self) -> &Path {
        &self.exe_dir
    }

    /// Authoritative site store.
    pub fn sites_path(&self) -> PathBuf {
        self.root.join(SITES_FILE)
    }

    /// Read-only override store shipped next to the executable.
    pub fn working_sites_path(&self) -> PathBuf {
        self.exe_dir.join(SITES_FILE)
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.root.join(ICONS_DIR)
    }

    /// Icon cache entry for a site.
    pub fn icon_path(&self, site_name: &str) -> PathBuf {
        self.icons_dir().join(format!("{site_name}.ico"))
    }

    pub fn default_icon_path(&self) -> PathBuf {
        self.icons_dir().join(DEFAULT_ICON_FILE)
    }

    /// Cached copy of the executable used for patch-mode runs.
    pub fn helper_exe(&self) -> PathBuf {
        self.root
            .join(format!("{HELPER_EXE_STEM}{}", std::env::consts::EXE_SUFFIX))
    }

    pub fn rcedit_path(&self) -> PathBuf {
        self.root.join(RCEDIT_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Browser profile directory for one site.
    pub fn webview_dir(&self, site_name: &str) -> PathBuf {
        self.root.join("webview").join(site_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_paths_live_under_icons_dir() {
        let layout = Layout::new("/data/Hobaa", "/apps");
        assert_eq!(
            layout.icon_path("github"),
            PathBuf::from("/data/Hobaa/icons/github.ico")
        );
        assert_eq!(
            layout.default_icon_path(),
            PathBuf::from("/data/Hobaa/icons/hobaa.ico")
        );
        assert_eq!(
            layout.working_sites_path(),
            PathBuf::from("/apps/sites.json")
        );
    }

    #[test]
    fn helper_uses_platform_suffix() {
        let layout = Layout::new("/data/Hobaa", "/apps");
        let helper = layout.helper_exe();
        let name = helper.file_name().and_then(|n| n.to_str()).unwrap_or("");
        assert!(name.starts_with("hobaa_icon_changer"));
        assert!(name.ends_with(std::env::consts::EXE_SUFFIX));
    }
}
