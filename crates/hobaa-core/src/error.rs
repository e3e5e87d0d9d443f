// ── Core error types ──
//
// Resolution and provisioning absorb almost every failure and degrade to
// the next tier, so the variants here are the ones that can actually
// surface: store I/O, an unwritable default icon, and patch-mode failures.
// `From<hobaa_api::Error>` exists so tiers can use `?` internally before
// deciding to swallow the result.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Site store ───────────────────────────────────────────────────
    #[error("Cannot read site store {path}: {source}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Site store {path} is not a valid site list: {source}")]
    StoreFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot write site store {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Icons ────────────────────────────────────────────────────────
    #[error("Default icon unavailable at {path}: {source}")]
    DefaultIcon {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Icon conversion failed: {message}")]
    IconConversion { message: String },

    // ── Relaunch / patch ─────────────────────────────────────────────
    #[error("Cannot start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resource editor failed on {executable}: {message}")]
    ResourceEditor {
        executable: PathBuf,
        message: String,
    },

    #[error("Patching {target} failed: {message}")]
    Patch { target: PathBuf, message: String },

    // ── Remote sources (normally absorbed) ───────────────────────────
    #[error("Remote source error: {0}")]
    Remote(#[from] hobaa_api::Error),

    // ── Generic I/O ──────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for CoreError {
    fn from(err: image::ImageError) -> Self {
        Self::IconConversion {
            message: err.to_string(),
        }
    }
}
