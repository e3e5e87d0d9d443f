// ── Site registry ──
//
// Ordered, name-keyed collection of sites backed by one `sites.json`.
// Insertion order is the persisted order; upserts keep a record's slot.

use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::CoreError;
use crate::model::Site;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteRegistry {
    sites: IndexMap<String, Site>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a JSON array of sites.
    ///
    /// A missing file is an empty registry. A file that exists but cannot
    /// be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no site store yet");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(CoreError::StoreRead {
                    path: path.to_owned(),
                    source,
                });
            }
        };

        if raw.trim().is_empty() {
            return Ok(Self::new());
        }

        let sites: Vec<Site> =
            serde_json::from_str(&raw).map_err(|source| CoreError::StoreFormat {
                path: path.to_owned(),
                source,
            })?;

        debug!(path = %path.display(), count = sites.len(), "site store loaded");
        Ok(Self::from_iter(sites))
    }

    /// Persist the registry as pretty JSON.
    ///
    /// The document is written to a temp file next to `path` and renamed
    /// over it, so a failed save never leaves a truncated store behind.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let write_err = |source: std::io::Error| CoreError::StoreWrite {
            path: path.to_owned(),
            source,
        };

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(write_err)?;

        let sites: Vec<&Site> = self.sites.values().collect();
        let json = serde_json::to_vec_pretty(&sites).map_err(|e| write_err(e.into()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        debug!(path = %path.display(), count = self.sites.len(), "site store saved");
        Ok(())
    }

    // ── Lookup ──────────────────────────────────────────────────────

    pub fn get(&self, name: &str) -> Option<&Site> {
        self.sites.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Site> {
        self.sites.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sites.contains_key(name)
    }

    /// The first site flagged active, if any.
    pub fn active(&self) -> Option<&Site> {
        self.sites.values().find(|s| s.is_active)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Insert or overwrite by name. An existing record keeps its position.
    pub fn add(&mut self, site: Site) {
        self.sites.insert(site.name.clone(), site);
    }

    /// Mark `name` active and every other site inactive.
    ///
    /// Returns `false` (and changes nothing) when `name` is unknown.
    pub fn set_active_exclusive(&mut self, name: &str) -> bool {
        if !self.sites.contains_key(name) {
            return false;
        }
        for (key, site) in &mut self.sites {
            site.is_active = key == name;
        }
        true
    }

    /// Append every site whose name is not already present.
    ///
    /// Existing records are never touched. Returns the number added.
    pub fn merge_missing<I>(&mut self, sites: I) -> usize
    where
        I: IntoIterator<Item = Site>,
    {
        let mut added = 0;
        for site in sites {
            if site.name.is_empty() || self.sites.contains_key(&site.name) {
                continue;
            }
            self.sites.insert(site.name.clone(), site);
            added += 1;
        }
        added
    }

    /// Record a new window size for `name`. Returns `true` when it changed.
    pub fn record_size(&mut self, name: &str, width: u32, height: u32) -> bool {
        match self.sites.get_mut(name) {
            Some(site) if site.width != width || site.height != height => {
                site.width = width;
                site.height = height;
                true
            }
            _ => false,
        }
    }
}

impl FromIterator<Site> for SiteRegistry {
    fn from_iter<T: IntoIterator<Item = Site>>(iter: T) -> Self {
        let mut registry = Self::new();
        for site in iter {
            registry.add(site);
        }
        registry
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn site(name: &str) -> Site {
        Site {
            is_active: false,
            ..Site::from_url(name, &format!("https://{name}.io"))
        }
    }

    fn names(reg: &SiteRegistry) -> Vec<&str> {
        reg.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let reg = SiteRegistry::load(&dir.path().join("sites.json")).unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = SiteRegistry::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::StoreFormat { .. }));
    }

    #[test]
    fn save_then_load_preserves_order_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sites.json");

        let mut reg = SiteRegistry::new();
        reg.add(site("zeta"));
        reg.add(Site {
            width: 1024,
            height: 768,
            icon: "ico/alpha.ico".into(),
            ..site("alpha")
        });
        reg.set_active_exclusive("alpha");
        reg.save(&path).unwrap();

        let loaded = SiteRegistry::load(&path).unwrap();
        assert_eq!(loaded, reg);
        assert_eq!(names(&loaded), ["zeta", "alpha"]);
    }

    #[test]
    fn add_overwrites_in_place() {
        let mut reg: SiteRegistry = ["a", "b", "c"].into_iter().map(site).collect();
        reg.add(Site {
            title: "Bee".into(),
            ..site("b")
        });
        assert_eq!(names(&reg), ["a", "b", "c"]);
        assert_eq!(reg.get("b").unwrap().title, "Bee");
    }

    #[test]
    fn set_active_exclusive_is_idempotent() {
        let mut reg: SiteRegistry = ["a", "b", "c"].into_iter().map(site).collect();
        reg.get_mut("c").unwrap().is_active = true;

        assert!(reg.set_active_exclusive("b"));
        let once = reg.clone();
        assert!(reg.set_active_exclusive("b"));
        assert_eq!(reg, once);

        let active: Vec<_> = reg.iter().filter(|s| s.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(reg.active().unwrap().name, "b");
    }

    #[test]
    fn set_active_exclusive_unknown_name_changes_nothing() {
        let mut reg: SiteRegistry = ["a"].into_iter().map(site).collect();
        reg.get_mut("a").unwrap().is_active = true;
        assert!(!reg.set_active_exclusive("missing"));
        assert!(reg.get("a").unwrap().is_active);
    }

    #[test]
    fn merge_missing_never_overwrites() {
        let mut reg = SiteRegistry::new();
        reg.add(Site {
            url: "https://local.example".into(),
            ..site("shared")
        });

        let added = reg.merge_missing(vec![
            Site {
                url: "https://remote.example".into(),
                ..site("shared")
            },
            site("fresh"),
        ]);

        assert_eq!(added, 1);
        assert_eq!(reg.get("shared").unwrap().url, "https://local.example");
        assert_eq!(names(&reg), ["shared", "fresh"]);
    }

    #[test]
    fn record_size_reports_changes_only() {
        let mut reg: SiteRegistry = ["a"].into_iter().map(site).collect();
        assert!(reg.record_size("a", 800, 600));
        assert!(!reg.record_size("a", 800, 600));
        assert!(!reg.record_size("nope", 1, 1));
    }
}
