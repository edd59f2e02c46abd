// Access Console - terminal front-end for a repository access-management server
//
// The server keeps email→username mappings, proxies collaborator changes to
// the hosting service and records an audit log. This tool drives it.
//
// Architecture:
// - API (reqwest): one typed request per server endpoint, behind a Backend trait
// - Controller: runs requests, renders results into regions, raises notifications
// - Console: the operations a user can perform (validation, messages, refreshes)
// - TUI (ratatui): tabs with forms, regions drawn from a shared surface
// - Headless: one subcommand, printed as text or HTML
// - Demo: in-process stand-in for the server

mod api;
mod cli;
mod config;
mod console;
mod controller;
mod demo;
mod headless;
mod logging;
mod model;
mod notify;
mod render;
mod tui;

use anyhow::{Context, Result};
use api::{Backend, HttpBackend};
use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, LoggingConfig};
use console::Console;
use controller::{Controller, MemorySurface};
use demo::DemoBackend;
use headless::OutputFormat;
use logging::{LogBuffer, TuiLogLayer};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config management never touches the backend
    if let Some(Commands::Config {
        show,
        reset,
        edit,
        update,
        path,
    }) = &cli.command
    {
        cli::handle_config(*show, *reset, *edit, *update, *path);
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if cli.demo {
        config.demo_mode = true;
    }

    // The TUI only runs when no subcommand was given
    let tui_mode = cli.command.is_none() && config.enable_tui;
    let log_buffer = LogBuffer::new();

    // Guard must outlive every log call so the file writer flushes
    let file_guard = init_tracing(&config.logging, tui_mode, &log_buffer);

    let backend: Arc<dyn Backend> = if config.demo_mode {
        tracing::info!("Running in DEMO MODE - requests answered in-process");
        Arc::new(DemoBackend::new())
    } else {
        Arc::new(
            HttpBackend::new(&config.api_url, config.request_timeout())
                .context("Failed to create backend client")?,
        )
    };
    let backend_label = if config.demo_mode {
        "demo".to_string()
    } else {
        config.api_url.clone()
    };
    tracing::debug!("Backend: {} ({})", backend.name(), backend_label);

    let surface = MemorySurface::new();
    let controller = Controller::new(
        backend,
        Arc::new(surface.clone()),
        config.notifications.notifier(),
        config.write_policy,
    );
    let console = Console::new(controller);

    let format = if cli.html {
        OutputFormat::Html
    } else {
        OutputFormat::Text
    };

    if let Some(command) = &cli.command {
        let outcome = headless::execute(&console, &surface, command, format).await;
        let code = headless::print(&outcome, format);
        drop(file_guard);
        std::process::exit(code);
    }

    if tui_mode {
        tracing::info!("Starting TUI");
        if let Err(e) = tui::run_tui(console, surface, log_buffer, backend_label).await {
            tracing::error!("TUI error: {:?}", e);
        }
    } else {
        tracing::info!("TUI disabled, printing startup regions");
        let outcome = headless::startup(&console, &surface, format).await;
        let code = headless::print(&outcome, format);
        drop(file_guard);
        std::process::exit(code);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing
///
/// In TUI mode logs go to the in-memory buffer (stdout would garble the
/// display); otherwise to stderr so stdout stays clean for results. A JSON
/// file layer with rotation is added when file logging is enabled.
///
/// Precedence: RUST_LOG env var > config file > default "info"
fn init_tracing(
    logging: &LoggingConfig,
    tui_mode: bool,
    log_buffer: &LogBuffer,
) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter_directive().into());

    let tui_layer = tui_mode.then(|| TuiLogLayer::new(log_buffer.clone()));
    let stderr_layer =
        (!tui_mode).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let (file_layer, guard) = match logging.file_enabled.then(|| logging.file_appender()) {
        Some(Ok(appender)) => {
            // Writes happen on a background thread
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!(
                "Warning: Could not create log directory {:?}: {}",
                logging.file_dir, e
            );
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tui_layer)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}
