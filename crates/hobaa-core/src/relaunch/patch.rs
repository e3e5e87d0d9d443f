// ── Executable icon patch ──
//
// The resource editor works on a copy next to the target. The target is
// only replaced once the copy has been patched successfully; any failure
// after the backup exists restores the backup over the target.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::ports::ResourceEditor;

fn sibling(target: &Path, suffix: &str) -> PathBuf {
    let mut name = target
        .file_name()
        .map_or_else(|| OsString::from("target"), ToOwned::to_owned);
    name.push(suffix);
    target.with_file_name(name)
}

/// Backup file kept while `target` is being patched.
pub fn backup_path(target: &Path) -> PathBuf {
    sibling(target, ".bak")
}

fn work_path(target: &Path) -> PathBuf {
    sibling(target, ".patching")
}

/// Bake `icon` into `target` through `editor`.
///
/// On error the target holds its original bytes again.
pub fn patch_executable(
    editor: &dyn ResourceEditor,
    target: &Path,
    icon: &Path,
) -> Result<(), CoreError> {
    let fail = |message: String| CoreError::Patch {
        target: target.to_owned(),
        message,
    };

    if !target.is_file() {
        return Err(fail("target executable does not exist".into()));
    }
    if !icon.is_file() {
        return Err(fail(format!("icon {} does not exist", icon.display())));
    }

    let backup = backup_path(target);
    std::fs::copy(target, &backup).map_err(|e| fail(format!("backup failed: {e}")))?;
    debug!(backup = %backup.display(), "target backed up");

    let work = work_path(target);
    let result = apply(editor, target, &work, icon);

    if work.exists() {
        if let Err(e) = std::fs::remove_file(&work) {
            debug!(work = %work.display(), error = %e, "could not remove work copy");
        }
    }

    match result {
        Ok(()) => {
            if let Err(e) = std::fs::remove_file(&backup) {
                debug!(error = %e, "could not remove backup");
            }
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "patch failed, restoring backup");
            restore(&backup, target)?;
            Err(e)
        }
    }
}

fn apply(
    editor: &dyn ResourceEditor,
    target: &Path,
    work: &Path,
    icon: &Path,
) -> Result<(), CoreError> {
    std::fs::copy(target, work)?;
    editor.set_icon(work, icon)?;
    std::fs::rename(work, target)?;
    Ok(())
}

fn restore(backup: &Path, target: &Path) -> Result<(), CoreError> {
    std::fs::copy(backup, target).map_err(|e| CoreError::Patch {
        target: target.to_owned(),
        message: format!(
            "restore from {} failed: {e}; original kept at backup path",
            backup.display()
        ),
    })?;
    if let Err(e) = std::fs::remove_file(backup) {
        debug!(error = %e, "could not remove backup after restore");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Stamp;

    impl ResourceEditor for Stamp {
        fn is_available(&self) -> bool {
            true
        }
        fn set_icon(&self, executable: &Path, _icon: &Path) -> Result<(), CoreError> {
            std::fs::write(executable, b"patched")?;
            Ok(())
        }
    }

    struct Corrupting;

    impl ResourceEditor for Corrupting {
        fn is_available(&self) -> bool {
            true
        }
        fn set_icon(&self, executable: &Path, _icon: &Path) -> Result<(), CoreError> {
            std::fs::write(executable, b"half-writ")?;
            Err(CoreError::ResourceEditor {
                executable: executable.to_owned(),
                message: "boom".into(),
            })
        }
    }

    fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("github.exe");
        let icon = dir.path().join("github.ico");
        std::fs::write(&target, b"original").unwrap();
        std::fs::write(&icon, [0, 0, 1, 0]).unwrap();
        (dir, target, icon)
    }

    #[test]
    fn success_replaces_target_and_cleans_up() {
        let (_dir, target, icon) = fixture();
        patch_executable(&Stamp, &target, &icon).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"patched");
        assert!(!backup_path(&target).exists());
        assert!(!work_path(&target).exists());
    }

    #[test]
    fn failure_keeps_original_bytes() {
        let (_dir, target, icon) = fixture();
        let err = patch_executable(&Corrupting, &target, &icon).unwrap_err();
        assert!(matches!(err, CoreError::ResourceEditor { .. }));
        assert_eq!(std::fs::read(&target).unwrap(), b"original");
        assert!(!backup_path(&target).exists());
        assert!(!work_path(&target).exists());
    }

    #[test]
    fn missing_icon_is_rejected_before_touching_target() {
        let (dir, target, _icon) = fixture();
        let err = patch_executable(&Stamp, &target, &dir.path().join("nope.ico")).unwrap_err();
        assert!(matches!(err, CoreError::Patch { .. }));
        assert!(!backup_path(&target).exists());
    }
}
