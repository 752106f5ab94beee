//! `scandeck` — Terminal dashboard for a remote endpoint-scanning service.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `scandeck-core`'s [`Monitor`](scandeck_core::Monitor). Two screens,
//! navigable via number keys: Results (1) and Logs (2).
//!
//! Logs are written to a file (default `/tmp/scandeck.log`) to avoid
//! corrupting the terminal UI. A background data bridge task forwards
//! monitor state changes into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and
//! app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use scandeck_api::{ScannerClient, TransportConfig};
use scandeck_core::{Monitor, PollIntervals, ScanParams};

use crate::app::App;

/// Terminal dashboard for monitoring a remote endpoint scanner.
#[derive(Parser, Debug)]
#[command(name = "scandeck", version, about)]
struct Cli {
    /// Scanner service base URL (e.g., http://127.0.0.1:5000)
    #[arg(short = 's', long, env = "SCANDECK_SERVER")]
    server: Option<String>,

    /// Path to a config file (defaults to the platform config dir)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log file path (defaults to /tmp/scandeck.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that
/// would corrupt the TUI output. Returns a guard that must be held for
/// the lifetime of the application to ensure logs are flushed.
fn setup_tracing(log_file: &std::path::Path, verbose: u8) -> WorkerGuard {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scandeck={log_level}")));

    let log_dir = log_file.parent().unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("scandeck.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
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

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Priority: CLI flags > config file > built-in defaults
    let mut config = match &cli.config {
        Some(path) => scandeck_config::load_config_from(path)
            .wrap_err_with(|| format!("loading config from {}", path.display()))?,
        None => scandeck_config::load_config().wrap_err("loading config")?,
    };
    if let Some(server) = &cli.server {
        config.server.clone_from(server);
    }
    if let Some(log_file) = &cli.log_file {
        config.log_file = Some(log_file.clone());
    }

    // Tracing to file — hold the guard so logs flush on exit
    let log_file = config
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from("/tmp/scandeck.log"));
    let _log_guard = setup_tracing(&log_file, cli.verbose);

    info!(server = %config.server, "starting scandeck");

    let base_url = config.server_url().wrap_err("invalid server URL")?;
    let transport = TransportConfig {
        timeout: config.timeout(),
    };
    let client = ScannerClient::new(base_url, &transport)
        .wrap_err("building HTTP client")?;
    let monitor = Monitor::new(client, PollIntervals::default());
    let scan_params: ScanParams = config.scan.clone().into();

    let mut app = App::new(monitor, scan_params);
    app.run().await?;

    Ok(())
}
