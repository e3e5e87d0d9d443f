//! Icon provisioning.
//!
//! Guarantees that `<icons>/<site>.ico` exists, pulling from the first
//! source that can supply it:
//!
//! 1. the file is already cached;
//! 2. the bundled catalog ships it;
//! 3. the remote catalog has the `ico/<file>` the site names;
//! 4. the site's icon URL downloads (converted to ICO when needed);
//! 5. the bundled default icon.
//!
//! Only the last step can fail the call.

mod convert;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hobaa_api::{HobaaClient, catalog_icon_url};
use strum::Display;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CoreError;
use crate::layout::DEFAULT_ICON_FILE;
use crate::model::IconRef;
use crate::ports::ResourceProvider;

pub use convert::{ICO_MAGIC, is_ico, to_ico};

/// Where a provisioned icon came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum IconOrigin {
    Cached,
    Catalog,
    RemoteCatalog,
    Downloaded,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedIcon {
    pub path: PathBuf,
    pub origin: IconOrigin,
}

pub struct IconProvisioner {
    icons_dir: PathBuf,
    resources: Arc<dyn ResourceProvider>,
    client: HobaaClient,
    remote_catalog: Option<Url>,
}

impl IconProvisioner {
    pub fn new(
        icons_dir: impl Into<PathBuf>,
        resources: Arc<dyn ResourceProvider>,
        client: HobaaClient,
        remote_catalog: Option<Url>,
    ) -> Self {
        Self {
            icons_dir: icons_dir.into(),
            resources,
            client,
            remote_catalog,
        }
    }

    pub fn icons_dir(&self) -> &Path {
        &self.icons_dir
    }

    pub fn icon_path(&self, site_name: &str) -> PathBuf {
        self.icons_dir.join(format!("{site_name}.ico"))
    }

    pub fn default_icon_path(&self) -> PathBuf {
        self.icons_dir.join(DEFAULT_ICON_FILE)
    }

    /// Whether `<icons>/<site>.ico` already exists.
    pub fn is_cached(&self, site_name: &str) -> bool {
        self.icon_path(site_name).is_file()
    }

    /// Make sure the icon for `site_name` is present in the cache.
    #[tracing::instrument(skip(self), fields(site = %site_name))]
    pub async fn ensure(
        &self,
        site_name: &str,
        icon: &IconRef,
    ) -> Result<ProvisionedIcon, CoreError> {
        let path = self.icon_path(site_name);
        if path.is_file() {
            debug!("icon already cached");
            return Ok(ProvisionedIcon {
                path,
                origin: IconOrigin::Cached,
            });
        }

        if let Some(origin) = self.try_sources(site_name, icon, &path).await {
            info!(%origin, path = %path.display(), "icon provisioned");
            return Ok(ProvisionedIcon { path, origin });
        }

        self.copy_default(&path).await?;
        info!(path = %path.display(), "using default icon");
        Ok(ProvisionedIcon {
            path,
            origin: IconOrigin::Default,
        })
    }

    /// Walk catalog, remote catalog and download in order. `None` means
    /// every source missed or failed.
    async fn try_sources(&self, site_name: &str, icon: &IconRef, path: &Path) -> Option<IconOrigin> {
        let own_file = format!("{site_name}.ico");
        let referenced = match icon {
            IconRef::Catalog(file) => Some(file.as_str()),
            _ => None,
        };

        for file in referenced.into_iter().chain(std::iter::once(own_file.as_str())) {
            if let Some(bytes) = self.resources.catalog_icon(file) {
                match self.install_bytes(path, &bytes).await {
                    Ok(()) => return Some(IconOrigin::Catalog),
                    Err(e) => warn!(file, error = %e, "bundled catalog icon unusable"),
                }
            }
        }

        match icon {
            IconRef::Catalog(file) => {
                let base = self.remote_catalog.as_ref()?;
                let url = match catalog_icon_url(base, file) {
                    Ok(url) => url,
                    Err(e) => {
                        warn!(file, error = %e, "bad remote catalog reference");
                        return None;
                    }
                };
                self.download_into(site_name, &url, path)
                    .await
                    .map(|()| IconOrigin::RemoteCatalog)
            }
            IconRef::Remote(url) => self
                .download_into(site_name, url, path)
                .await
                .map(|()| IconOrigin::Downloaded),
            IconRef::None | IconRef::Default => None,
        }
    }

    /// Download `url` via `temp_<name>`, normalize to ICO, move into place.
    async fn download_into(&self, site_name: &str, url: &Url, path: &Path) -> Option<()> {
        let temp = self.icons_dir.join(format!("temp_{site_name}"));

        let result = async {
            self.client.download(url, &temp).await?;
            let bytes = tokio::fs::read(&temp).await?;
            if is_ico(&bytes) {
                tokio::fs::rename(&temp, path).await?;
            } else {
                debug!("downloaded icon is not ICO, converting");
                let ico = to_ico(&bytes)?;
                tokio::fs::write(path, ico).await?;
            }
            Ok::<(), CoreError>(())
        }
        .await;

        if tokio::fs::try_exists(&temp).await.unwrap_or(false) {
            if let Err(e) = tokio::fs::remove_file(&temp).await {
                debug!(temp = %temp.display(), error = %e, "could not remove temp icon");
            }
        }

        match result {
            Ok(()) => Some(()),
            Err(e) => {
                warn!(%url, error = %e, "icon download failed");
                None
            }
        }
    }

    async fn install_bytes(&self, path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
        tokio::fs::create_dir_all(&self.icons_dir).await?;
        if is_ico(bytes) {
            tokio::fs::write(path, bytes).await?;
        } else {
            tokio::fs::write(path, to_ico(bytes)?).await?;
        }
        Ok(())
    }

    async fn copy_default(&self, path: &Path) -> Result<(), CoreError> {
        let default = self.ensure_default().await?;
        tokio::fs::copy(&default, path)
            .await
            .map_err(|source| CoreError::DefaultIcon {
                path: path.to_owned(),
                source,
            })?;
        Ok(())
    }

    // ── Bootstrap helpers ───────────────────────────────────────────

    /// Write the bundled `hobaa.ico` into the cache if it is missing.
    pub async fn ensure_default(&self) -> Result<PathBuf, CoreError> {
        let path = self.default_icon_path();
        if path.is_file() {
            return Ok(path);
        }

        let bytes = self.resources.default_icon()?;
        let write = async {
            tokio::fs::create_dir_all(&self.icons_dir).await?;
            tokio::fs::write(&path, bytes).await
        };
        write.await.map_err(|source| CoreError::DefaultIcon {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "default icon written");
        Ok(path)
    }

    /// Copy every bundled catalog icon that is not cached yet.
    ///
    /// Returns the number of files written. Individual failures are logged.
    pub async fn install_catalog(&self) -> usize {
        let mut written = 0;
        for file in self.resources.catalog_files() {
            let target = self.icons_dir.join(&file);
            if target.is_file() {
                continue;
            }
            let Some(bytes) = self.resources.catalog_icon(&file) else {
                continue;
            };
            match self.install_bytes(&target, &bytes).await {
                Ok(()) => written += 1,
                Err(e) => warn!(file, error = %e, "could not install catalog icon"),
            }
        }
        written
    }
}

impl std::fmt::Debug for IconProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconProvisioner")
            .field("icons_dir", &self.icons_dir)
            .field("remote_catalog", &self.remote_catalog)
            .finish_non_exhaustive()
    }
}
