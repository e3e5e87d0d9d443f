// Site-source HTTP client
//
// Wraps `reqwest::Client` with the handful of requests Hobaa makes:
// fetching the published site list, probing a site for its favicon,
// and downloading icon files. Everything is bounded by the transport
// timeout and returns `Error` rather than retrying; the caller decides
// whether to fall through to the next source.

use std::path::Path;

use reqwest::StatusCode;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::RemoteSite;
use crate::transport::TransportConfig;

/// Favicon locations probed in order, relative to the site root.
const FAVICON_CANDIDATES: [&str; 2] = ["/favicon.ico", "/favicon.png"];

/// HTTP client for every remote source Hobaa consults.
#[derive(Debug, Clone)]
pub struct HobaaClient {
    http: reqwest::Client,
}

impl HobaaClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    // ── Site list ────────────────────────────────────────────────────

    /// Fetch and parse a published `sites.json`.
    ///
    /// Anything other than `200 OK` with a JSON array body is an error.
    pub async fn fetch_sites(&self, url: &Url) -> Result<Vec<RemoteSite>, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url.clone()).send().await?;
        let body = expect_ok(resp).await?.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    // ── Favicons ─────────────────────────────────────────────────────

    /// Find a favicon for `site` by probing the well-known locations.
    ///
    /// `HEAD /favicon.ico`, then `HEAD /favicon.png`; the first `200`
    /// wins. Redirects are followed by the client.
    pub async fn discover_favicon(&self, site: &Url) -> Result<Url, Error> {
        for candidate in FAVICON_CANDIDATES {
            let url = site.join(candidate)?;
            trace!("HEAD {}", url);
            match self.http.head(url.clone()).send().await {
                Ok(resp) if resp.status() == StatusCode::OK => {
                    debug!(favicon = %url, "favicon found");
                    return Ok(url);
                }
                Ok(resp) => trace!(status = %resp.status(), "favicon probe missed"),
                Err(e) => trace!(error = %e, "favicon probe failed"),
            }
        }

        Err(Error::FaviconNotFound {
            site: site.to_string(),
        })
    }

    // ── Downloads ────────────────────────────────────────────────────

    /// Download `url` into `target`, creating parent directories.
    ///
    /// Returns the number of bytes written. A non-`200` answer leaves
    /// `target` untouched.
    pub async fn download(&self, url: &Url, target: &Path) -> Result<u64, Error> {
        debug!(target = %target.display(), "GET {}", url);

        let resp = self.http.get(url.clone()).send().await?;
        let bytes = expect_ok(resp).await?.bytes().await?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(target, &bytes).await?;

        Ok(u64::try_from(bytes.len()).unwrap_or(u64::MAX))
    }
}

/// Join a catalog base URL and an icon file name.
///
/// The base is treated as a directory whether or not it ends in `/`.
pub fn catalog_icon_url(base: &Url, file: &str) -> Result<Url, Error> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(file)?)
}

async fn expect_ok(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status == StatusCode::OK {
        return Ok(resp);
    }
    Err(Error::Status {
        url: resp.url().to_string(),
        status: status.as_u16(),
    })
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
