//! Identity resolution.
//!
//! Maps the executable's base name to a [`Site`] by consulting sources in
//! strict order and stopping at the first hit:
//!
//! 1. forced mode with a local record
//! 2. a local record that is already active
//! 3. a local inactive record whose icon is already cached
//! 4. the `sites.json` next to the executable
//! 5. the published remote `sites.json`
//! 6. the name read as a URL
//! 7. a synthesized site pointing at the fallback URL
//!
//! Tiers 4 to 7 upsert over any inactive local record, keeping only its
//! stored window size.
//!
//! Network and override-file failures never abort resolution; they are
//! logged and the next tier runs.

mod url_hint;

use std::path::PathBuf;

use hobaa_api::HobaaClient;
use strum::Display;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CoreError;
use crate::icon::{IconOrigin, IconProvisioner, ProvisionedIcon};
use crate::model::{DEFAULT_ICON_SENTINEL, IconRef, Site};
use crate::store::SiteRegistry;

pub use url_hint::{SiteAddress, infer_url, is_usable_site_url, looks_like_host};

/// Source a site record was adopted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SiteOrigin {
    /// `sites.json` next to the executable.
    WorkingDir,
    /// The published remote site list.
    Remote,
}

/// Which tier produced the resolved site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ResolveOutcome {
    Forced,
    AlreadyActive,
    Reactivated,
    Adopted(SiteOrigin),
    Inferred,
    Synthesized,
}

impl ResolveOutcome {
    /// Whether the executable's icon may be stale after this outcome.
    pub fn requires_sync(self) -> bool {
        !matches!(self, Self::Forced | Self::AlreadyActive)
    }
}

/// Result of one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub site: Site,
    pub outcome: ResolveOutcome,
    /// The site's cached icon; `None` when no provisioning happened and
    /// no cache entry exists.
    pub icon: Option<ProvisionedIcon>,
    /// Resolution ran in forced mode. Forced runs never schedule a patch.
    pub forced: bool,
}

impl Resolution {
    /// Whether the relaunch coordinator should attempt an icon patch.
    pub fn requires_sync(&self) -> bool {
        !self.forced && self.outcome.requires_sync() && self.icon.is_some()
    }
}

pub struct IdentityResolver {
    sites_path: PathBuf,
    working_sites_path: PathBuf,
    fallback_url: SiteAddress,
    remote_sites_url: Option<Url>,
    client: HobaaClient,
    provisioner: IconProvisioner,
}

impl IdentityResolver {
    pub fn new(
        sites_path: impl Into<PathBuf>,
        working_sites_path: impl Into<PathBuf>,
        fallback_url: SiteAddress,
        remote_sites_url: Option<Url>,
        client: HobaaClient,
        provisioner: IconProvisioner,
    ) -> Self {
        Self {
            sites_path: sites_path.into(),
            working_sites_path: working_sites_path.into(),
            fallback_url,
            remote_sites_url,
            client,
            provisioner,
        }
    }

    pub fn provisioner(&self) -> &IconProvisioner {
        &self.provisioner
    }

    /// Resolve `name` against `registry`, persisting any change.
    #[tracing::instrument(skip(self, registry), fields(name = %name))]
    pub async fn resolve(
        &self,
        registry: &mut SiteRegistry,
        name: &str,
        forced: bool,
    ) -> Result<Resolution, CoreError> {
        if let Some(resolution) = self.resolve_local(registry, name, forced) {
            info!(outcome = %resolution.outcome, "resolved from local store");
            return Ok(resolution);
        }

        let (site, outcome) = if let Some(site) = self.working_dir_site(name) {
            (site, ResolveOutcome::Adopted(SiteOrigin::WorkingDir))
        } else if let Some(site) = self.remote_site(name).await {
            (site, ResolveOutcome::Adopted(SiteOrigin::Remote))
        } else if let Some(address) = infer_url(name) {
            (self.inferred_site(name, &address).await, ResolveOutcome::Inferred)
        } else {
            (self.synthesized_site(name), ResolveOutcome::Synthesized)
        };

        let resolution = self.adopt(registry, site, outcome, forced).await?;
        info!(
            outcome = %resolution.outcome,
            url = %resolution.site.url,
            icon_origin = ?resolution.icon.as_ref().map(|i| i.origin),
            "site resolved"
        );
        Ok(resolution)
    }

    /// Tiers 1 to 3: answers that need nothing but the local store.
    fn resolve_local(
        &self,
        registry: &mut SiteRegistry,
        name: &str,
        forced: bool,
    ) -> Option<Resolution> {
        let existing = registry.get(name)?;
        let is_active = existing.is_active;
        let cached = self.cached_icon(name);

        let outcome = if forced {
            ResolveOutcome::Forced
        } else if is_active {
            ResolveOutcome::AlreadyActive
        } else if cached.is_some() {
            ResolveOutcome::Reactivated
        } else {
            return None;
        };

        if outcome != ResolveOutcome::AlreadyActive {
            registry.set_active_exclusive(name);
            self.persist(registry);
        }

        let site = registry.get(name)?.clone();
        Some(Resolution {
            site,
            outcome,
            icon: cached,
            forced,
        })
    }

    /// Store `site` as the active record, provision its icon, persist.
    async fn adopt(
        &self,
        registry: &mut SiteRegistry,
        mut site: Site,
        outcome: ResolveOutcome,
        forced: bool,
    ) -> Result<Resolution, CoreError> {
        if let Some(existing) = registry.get(&site.name) {
            site.keep_dimensions_of(existing);
        }
        site.is_active = true;

        let icon = self.provisioner.ensure(&site.name, &site.icon_ref()).await?;
        if icon.origin == IconOrigin::Default && site.icon_ref() == IconRef::None {
            site.icon = DEFAULT_ICON_SENTINEL.to_owned();
        }

        let name = site.name.clone();
        registry.add(site);
        registry.set_active_exclusive(&name);
        self.persist(registry);

        let site = registry
            .get(&name)
            .cloned()
            .unwrap_or_else(|| Site::from_url(&name, self.fallback_url.as_str()));
        Ok(Resolution {
            site,
            outcome,
            icon: Some(icon),
            forced,
        })
    }

    // ── Sources ─────────────────────────────────────────────────────

    fn working_dir_site(&self, name: &str) -> Option<Site> {
        if self.working_sites_path == self.sites_path {
            return None;
        }
        match SiteRegistry::load(&self.working_sites_path) {
            Ok(local) => local.get(name).cloned(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable working-directory site list");
                None
            }
        }
    }

    async fn remote_site(&self, name: &str) -> Option<Site> {
        let url = self.remote_sites_url.as_ref()?;
        match self.client.fetch_sites(url).await {
            Ok(remote) => {
                let mut registry = SiteRegistry::new();
                registry.merge_missing(remote.into_iter().map(Site::from));
                debug!(count = registry.len(), "remote site list fetched");
                registry.get(name).cloned()
            }
            Err(e) => {
                debug!(error = %e, transient = e.is_transient(), "remote site list unavailable");
                None
            }
        }
    }

    async fn inferred_site(&self, name: &str, address: &SiteAddress) -> Site {
        let mut site = Site::from_url(name, address.as_str());
        match self.client.discover_favicon(address.url()).await {
            Ok(favicon) => site.icon = favicon.to_string(),
            Err(e) => {
                debug!(error = %e, not_found = e.is_not_found(), "favicon discovery failed");
                site.icon = DEFAULT_ICON_SENTINEL.to_owned();
            }
        }
        site
    }

    fn synthesized_site(&self, name: &str) -> Site {
        Site {
            icon: DEFAULT_ICON_SENTINEL.to_owned(),
            ..Site::from_url(name, self.fallback_url.as_str())
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn cached_icon(&self, name: &str) -> Option<ProvisionedIcon> {
        self.provisioner.is_cached(name).then(|| ProvisionedIcon {
            path: self.provisioner.icon_path(name),
            origin: IconOrigin::Cached,
        })
    }

    fn persist(&self, registry: &SiteRegistry) {
        if let Err(e) = registry.save(&self.sites_path) {
            warn!(error = %e, "site store not saved");
        }
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("sites_path", &self.sites_path)
            .field("working_sites_path", &self.working_sites_path)
            .field("fallback_url", &self.fallback_url)
            .field("remote_sites_url", &self.remote_sites_url)
            .finish_non_exhaustive()
    }
}
