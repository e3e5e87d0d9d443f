// ── Bundled resources ──
//
// Files that ship with the executable: the default icon, the icon
// catalog under `resources/icons/ico/`, and the seed site list compiled
// into the binary. A missing `default.ico` is replaced by a generated one
// so first launch never fails for lack of an icon.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use ico::{IconDir, IconDirEntry, IconImage, ResourceType};
use image::{Rgba, RgbaImage};
use tracing::warn;

use hobaa_core::{CoreError, ResourceProvider, Site};

const SEED_SITES: &str = include_str!("../resources/sites.json");

const BACKGROUND: Rgba<u8> = Rgba([32, 96, 176, 255]);
const STRIPE: Rgba<u8> = Rgba([236, 242, 250, 255]);

#[derive(Debug, Clone)]
pub struct BundledResources {
    root: PathBuf,
}

impl BundledResources {
    /// Resources shipped in `<exe_dir>/resources`.
    pub fn new(exe_dir: &Path) -> Self {
        Self {
            root: exe_dir.join("resources"),
        }
    }

    fn catalog_dir(&self) -> PathBuf {
        self.root.join("icons").join("ico")
    }
}

impl ResourceProvider for BundledResources {
    fn default_icon(&self) -> Result<Vec<u8>, CoreError> {
        let shipped = self.root.join("default.ico");
        match std::fs::read(&shipped) {
            Ok(bytes) => Ok(bytes),
            Err(_) => generated_icon(),
        }
    }

    fn catalog_icon(&self, file: &str) -> Option<Vec<u8>> {
        // Catalog names are plain file names; anything with a path is refused.
        if file.is_empty() || Path::new(file).components().count() != 1 {
            return None;
        }
        std::fs::read(self.catalog_dir().join(file)).ok()
    }

    fn catalog_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.catalog_dir()) else {
            return Vec::new();
        };
        let mut files: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| name.to_ascii_lowercase().ends_with(".ico"))
            .collect();
        files.sort();
        files
    }

    fn seed_sites(&self) -> Vec<Site> {
        serde_json::from_str(SEED_SITES).unwrap_or_else(|e| {
            warn!(error = %e, "bundled site list is malformed");
            Vec::new()
        })
    }
}

/// Draw the fallback application icon: a rounded blue tile with a light
/// horizontal bar, at the usual shell sizes.
pub fn generated_icon() -> Result<Vec<u8>, CoreError> {
    let mut dir = IconDir::new(ResourceType::Icon);
    for size in [16u32, 32, 48, 256] {
        let image = draw_tile(size);
        let entry = IconDirEntry::encode(&IconImage::from_rgba_data(size, size, image.into_raw()))?;
        dir.add_entry(entry);
    }
    let mut out = Cursor::new(Vec::new());
    dir.write(&mut out)?;
    Ok(out.into_inner())
}

fn draw_tile(size: u32) -> RgbaImage {
    let radius = (size / 5).max(2);
    let stripe = (size * 3 / 8)..(size * 5 / 8);
    let margin = size / 4;

    RgbaImage::from_fn(size, size, |x, y| {
        if !inside_rounded(x, y, size, radius) {
            return Rgba([0, 0, 0, 0]);
        }
        if stripe.contains(&y) && x >= margin && x < size - margin {
            STRIPE
        } else {
            BACKGROUND
        }
    })
}

fn inside_rounded(x: u32, y: u32, size: u32, radius: u32) -> bool {
    let cx = if x < radius {
        radius - x
    } else if x >= size - radius {
        x + 1 - (size - radius)
    } else {
        0
    };
    let cy = if y < radius {
        radius - y
    } else if y >= size - radius {
        y + 1 - (size - radius)
    } else {
        0
    };
    cx * cx + cy * cy <= radius * radius
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn generated_icon_is_a_real_ico() {
        let bytes = generated_icon().unwrap();
        assert!(hobaa_core::icon::is_ico(&bytes));
        let dir = IconDir::read(Cursor::new(bytes)).unwrap();
        assert_eq!(dir.entries().len(), 4);
    }

    #[test]
    fn seed_sites_parse() {
        let resources = BundledResources::new(Path::new("/nonexistent"));
        let sites = resources.seed_sites();
        assert!(!sites.is_empty());
        assert!(sites.iter().all(|s| !s.name.is_empty() && !s.is_active));
    }

    #[test]
    fn catalog_reads_plain_names_only() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("resources").join("icons").join("ico");
        std::fs::create_dir_all(&catalog).unwrap();
        std::fs::write(catalog.join("github.ico"), [0, 0, 1, 0]).unwrap();
        std::fs::write(catalog.join("notes.txt"), "x").unwrap();

        let resources = BundledResources::new(dir.path());
        assert_eq!(resources.catalog_files(), vec!["github.ico".to_owned()]);
        assert!(resources.catalog_icon("github.ico").is_some());
        assert!(resources.catalog_icon("../github.ico").is_none());
        assert!(resources.catalog_icon("missing.ico").is_none());
    }
}
