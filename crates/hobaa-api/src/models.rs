// ── Wire types for the remote site list ──
//
// The remote `sites.json` is a bare JSON array. Optional fields are
// routinely absent, so every field except `name` defaults.

use serde::Deserialize;

/// One entry of the remote site list, exactly as published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteSite {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_active: bool,
}
