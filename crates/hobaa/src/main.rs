//! `hobaa`: one executable, many site-specific browsers.
//!
//! The file name the executable runs under picks the site: `github.exe`
//! opens GitHub, `mail.google.com.exe` opens that host. On the first run
//! under a new name the executable hands off to a detached helper that
//! bakes the site's icon into it, then relaunches.
//!
//! Logs go to a daily file under `<appdata>/Hobaa/logs/` since the
//! launcher normally runs without a console.

mod app;
mod cli;
mod error;
mod os;
mod resources;
mod shell;
#[cfg(windows)]
mod webview;

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{App, RunOutcome};
use crate::cli::Cli;
use crate::error::{CliError, exit_code};

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let exe_path = match std::env::current_exe() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(CliError::from(e)));
            std::process::exit(exit_code::GENERAL);
        }
    };
    let layout = hobaa_config::layout_for(&exe_path);

    // Hold the guard so buffered log lines flush on exit.
    let _log_guard = init_tracing(cli.verbose, &layout.logs_dir());

    let code = match run(&cli, exe_path, layout).await {
        Ok(outcome) => {
            info!(?outcome, "finished");
            exit_code::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}

async fn run(
    cli: &Cli,
    exe_path: std::path::PathBuf,
    layout: hobaa_core::Layout,
) -> Result<RunOutcome, CliError> {
    let invocation = cli.invocation()?;
    info!(exe = %exe_path.display(), ?invocation, "hobaa starting");

    let app = App::new(exe_path, layout)?;
    app.run(invocation).await
}

/// Daily-rolling file log. Falls back to stderr when the log directory
/// cannot be created.
fn init_tracing(verbosity: u8, log_dir: &Path) -> Option<WorkerGuard> {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,hobaa={level},hobaa_core={level},hobaa_api={level},hobaa_config={level}"
        ))
    });

    if std::fs::create_dir_all(log_dir).is_err() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, "hobaa.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Some(guard)
}
