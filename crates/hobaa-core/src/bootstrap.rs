// ── First-run preparation ──
//
// Runs before every resolution: directories, the default icon, the bundled
// icon catalog, and the bundled site list merged into the local store.

use tracing::{debug, info};

use crate::error::CoreError;
use crate::icon::IconProvisioner;
use crate::layout::Layout;
use crate::ports::ResourceProvider;
use crate::store::SiteRegistry;

/// Prepare the data directory and return the loaded local registry.
///
/// Fails only when the data directory or default icon cannot be written,
/// or when the local store exists but is unreadable.
pub async fn bootstrap(
    layout: &Layout,
    provisioner: &IconProvisioner,
    resources: &dyn ResourceProvider,
) -> Result<SiteRegistry, CoreError> {
    tokio::fs::create_dir_all(layout.icons_dir()).await?;

    provisioner.ensure_default().await?;

    let installed = provisioner.install_catalog().await;
    if installed > 0 {
        debug!(installed, "bundled catalog icons installed");
    }

    let sites_path = layout.sites_path();
    let mut registry = SiteRegistry::load(&sites_path)?;
    let seeded = registry.merge_missing(resources.seed_sites());
    if seeded > 0 {
        registry.save(&sites_path)?;
        info!(seeded, "bundled sites added to local store");
    }

    Ok(registry)
}
