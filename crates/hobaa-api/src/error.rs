use thiserror::Error;

/// Top-level error type for the `hobaa-api` crate.
///
/// Every network lookup Hobaa performs is optional: callers in `hobaa-core`
/// treat these errors as "source unavailable" and fall through to the next
/// tier. The variants exist so the logs can say *why* a tier was skipped.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The server answered with something other than `200 OK`.
    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Neither `/favicon.ico` nor `/favicon.png` answered on the site.
    #[error("no favicon found for {site}")]
    FaviconNotFound { site: String },

    // ── Local ───────────────────────────────────────────────────────
    /// Writing a downloaded body to disk failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if this error came from a slow or unreachable host
    /// rather than from an answer we did not like.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if the remote resource simply does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 404,
            Self::FaviconNotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }
}
