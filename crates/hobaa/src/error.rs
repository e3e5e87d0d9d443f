//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use hobaa_config::ConfigError;
use hobaa_core::CoreError;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const PATCH: i32 = 3;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Usage ────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(hobaa::usage),
        help("Run without arguments to open the site named by this executable.")
    )]
    Usage { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid configuration: {source}")]
    #[diagnostic(
        code(hobaa::config),
        help("Fix or remove the offending entry in {path}, or unset the HOBAA_* override.")
    )]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    // ── Patch helper ─────────────────────────────────────────────────
    #[error("Could not update the icon of {}", target.display())]
    #[diagnostic(
        code(hobaa::patch_failed),
        help(
            "The original executable was restored and relaunched.\n\
             Make sure rcedit.exe is present and the file is not read-only."
        )
    )]
    PatchFailed {
        target: PathBuf,
        #[source]
        source: CoreError,
    },

    // ── Rendering ────────────────────────────────────────────────────
    #[error("No supported browser found")]
    #[diagnostic(
        code(hobaa::no_browser),
        help(
            "Install Microsoft Edge, Google Chrome or Chromium,\n\
             or set `browser = \"<path>\"` in {config}."
        )
    )]
    NoBrowser { config: String },

    #[error("Could not open the site window: {message}")]
    #[diagnostic(
        code(hobaa::window),
        help("Install or repair the Microsoft Edge WebView2 Runtime.")
    )]
    Window { message: String },

    #[error("Could not start {}", program.display())]
    #[diagnostic(code(hobaa::launch_failed))]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Wrapped ──────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(hobaa::core))]
    Core(#[from] CoreError),

    #[error(transparent)]
    #[diagnostic(code(hobaa::network))]
    Api(#[from] hobaa_api::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config(err: ConfigError, path: &std::path::Path) -> Self {
        Self::Config {
            path: path.display().to_string(),
            source: err,
        }
    }

    /// Wrap a helper-mode failure, keeping non-patch errors as they are.
    pub fn patch(target: PathBuf, err: CoreError) -> Self {
        match err {
            CoreError::Patch { .. } | CoreError::ResourceEditor { .. } => Self::PatchFailed {
                target,
                source: err,
            },
            other => Self::Core(other),
        }
    }

    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } => exit_code::USAGE,
            Self::PatchFailed { .. } => exit_code::PATCH,
            _ => exit_code::GENERAL,
        }
    }
}
