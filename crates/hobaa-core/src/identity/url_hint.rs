// ── Executable-name URL heuristic ──
//
// A copy named `mail.google.com.exe` should open that host. Random names
// like `notes` must not be mistaken for hosts, so a name only qualifies
// when it carries a well-known TLD or at least a dot.

use url::Url;

const COMMON_TLDS: [&str; 10] = [
    ".com", ".net", ".org", ".io", ".co", ".edu", ".gov", ".info", ".biz", ".app",
];

/// Cheap textual check run before any parsing.
pub fn looks_like_host(name: &str) -> bool {
    let has_tld = COMMON_TLDS
        .iter()
        .any(|tld| name.ends_with(tld) || name.contains(&format!("{tld}/")));
    has_tld || name.contains('.')
}

/// A site URL as written, plus its parsed form.
///
/// `Url` normalizes on parse (`https://host` becomes `https://host/`), so
/// the text stored in `sites.json` comes from `as_str()`, never from the
/// parsed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteAddress {
    raw: String,
    url: Url,
}

impl SiteAddress {
    /// Accept `raw` when it is an absolute `http(s)` URL with a host.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let url = Url::parse(raw).ok().filter(is_site_url)?;
        Some(Self {
            raw: raw.to_owned(),
            url,
        })
    }

    /// The text exactly as it will be persisted.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl std::fmt::Display for SiteAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// The URL an executable name stands for, if it stands for one.
///
/// Names carrying an `http(s)` scheme are kept as they are; any other
/// name gets `https://` in front.
pub fn infer_url(name: &str) -> Option<SiteAddress> {
    let name = name.trim();
    if name.is_empty() || !looks_like_host(name) {
        return None;
    }

    SiteAddress::parse(name).or_else(|| SiteAddress::parse(&format!("https://{name}")))
}

/// Whether `raw` is usable as a site URL: absolute `http(s)` with a host.
pub fn is_usable_site_url(raw: &str) -> bool {
    SiteAddress::parse(raw).is_some()
}

fn is_site_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
}
