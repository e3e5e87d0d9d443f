// ── Site domain type ──

use serde::{Deserialize, Serialize};
use url::Url;

/// Icon reference meaning "use the bundled default icon".
pub const DEFAULT_ICON_SENTINEL: &str = "default://hobaa.ico";

/// Prefix marking an icon reference as a named entry of the icon catalog.
pub const CATALOG_ICON_PREFIX: &str = "ico/";

/// One site-specific browser identity, keyed by executable name.
///
/// Optional fields are omitted from the persisted JSON when empty, so a
/// hand-written `sites.json` only needs `name`, `title`, and `url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Executable base name without extension. Case-sensitive.
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Window width in pixels; `0` means "use the default".
    #[serde(default, skip_serializing_if = "is_zero")]
    pub width: u32,
    /// Window height in pixels; `0` means "use the default".
    #[serde(default, skip_serializing_if = "is_zero")]
    pub height: u32,
    /// Raw icon reference; see [`IconRef::parse`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_active: bool,
}

impl Site {
    /// A fresh, active site whose title is its name.
    pub fn from_url(name: &str, url: &str) -> Self {
        Self {
            name: name.to_owned(),
            title: name.to_owned(),
            url: url.to_owned(),
            is_active: true,
            ..Self::default()
        }
    }

    /// Parsed view of the `icon` field.
    pub fn icon_ref(&self) -> IconRef {
        IconRef::parse(&self.icon)
    }

    /// Title as shown in the window caption: first character upper-cased.
    pub fn display_title(&self) -> String {
        capitalize_first(&self.title)
    }

    /// Adopt `width`/`height` from `existing` wherever it has a positive value.
    pub fn keep_dimensions_of(&mut self, existing: &Site) {
        if existing.width > 0 {
            self.width = existing.width;
        }
        if existing.height > 0 {
            self.height = existing.height;
        }
    }
}

/// Where a site's icon is supposed to come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconRef {
    /// No reference recorded; favicon discovery may still fill it in.
    None,
    /// The bundled default icon (`default://hobaa.ico`).
    Default,
    /// A named file of the icon catalog (`ico/<file>`).
    Catalog(String),
    /// An absolute `http(s)` URL.
    Remote(Url),
}

impl IconRef {
    /// Parse the raw `icon` field of a [`Site`].
    ///
    /// Anything unrecognised is treated as [`IconRef::None`].
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::None;
        }
        if raw == DEFAULT_ICON_SENTINEL || raw.starts_with("default://") {
            return Self::Default;
        }
        if let Some(file) = raw.strip_prefix(CATALOG_ICON_PREFIX) {
            return if file.is_empty() {
                Self::None
            } else {
                Self::Catalog(file.to_owned())
            };
        }
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::None,
        }
    }
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &u32) -> bool {
    *v == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(v: &bool) -> bool {
    !*v
}
