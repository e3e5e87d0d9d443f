//! Site resolution and icon synchronization for Hobaa.
//!
//! One executable image acts as many site-specific browsers: its file name
//! selects the site. This crate decides which site a name stands for,
//! makes sure an icon for it exists on disk, and coordinates the
//! self-relaunch that bakes that icon into the executable.
//!
//! Operating-system collaborators (process spawning, the PE resource
//! editor, bundled resources) are injected through the traits in
//! [`ports`]. Configuration arrives as [`Settings`] and [`Layout`]; the
//! crate never reads config files itself.

pub mod bootstrap;
pub mod convert;
pub mod error;
pub mod icon;
pub mod identity;
pub mod layout;
pub mod model;
pub mod ports;
pub mod relaunch;
pub mod settings;
pub mod store;
pub mod window;

// ── Primary re-exports ──────────────────────────────────────────────

pub use bootstrap::bootstrap;
pub use error::CoreError;
pub use icon::{IconOrigin, IconProvisioner, ProvisionedIcon};
pub use identity::{IdentityResolver, Resolution, ResolveOutcome, SiteAddress, SiteOrigin};
pub use layout::Layout;
pub use model::{IconRef, Invocation, PatchRequest, Site};
pub use ports::{OsIntegration, ResourceEditor, ResourceProvider};
pub use relaunch::{LaunchDecision, LaunchState, RelaunchCoordinator};
pub use settings::Settings;
pub use store::SiteRegistry;
pub use window::{DisplayDefaults, SizeWatcher, WindowProbe, WindowSize, WindowSpec};
