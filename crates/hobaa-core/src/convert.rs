// ── API → domain conversion ──

use hobaa_api::RemoteSite;

use crate::model::Site;

impl From<RemoteSite> for Site {
    fn from(remote: RemoteSite) -> Self {
        Self {
            name: remote.name,
            title: remote.title,
            url: remote.url,
            width: remote.width,
            height: remote.height,
            icon: remote.icon,
            is_active: remote.is_active,
        }
    }
}
