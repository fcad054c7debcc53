//! GUI entry point for bench-console.
//!
//! Loads the configuration, sets up tracing, starts the simulated supply on a tokio runtime
//! and opens the console window at the saved geometry.
//!
//! # Usage
//!
//! ```bash
//! bench-console --config config/default.toml --log-level debug
//! ```

use anyhow::{Context, Result};
use bench_console::config::ConsoleConfig;
use bench_console::gui::ConsoleApp;
use bench_console::logging;
use bench_console::settings::{SettingsStore, WindowGeometry};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bench-console")]
#[command(about = "Operator console for a bench power source", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(cli: &Cli) -> Result<ConsoleConfig> {
    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConsoleConfig::load()?,
    };
    if let Some(level) = &cli.log_level {
        config.application.log_level = level.clone();
        config.validate()?;
    }
    Ok(config)
}

fn open_settings(config: &ConsoleConfig) -> SettingsStore {
    let path = match &config.window.settings_file {
        Some(path) => path.clone(),
        None => SettingsStore::default_path(&config.application.name).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to a settings file in the working directory");
            PathBuf::from("settings.json")
        }),
    };
    SettingsStore::open(&path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable settings");
        SettingsStore::new(path)
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    logging::init_from_config(&config)?;
    tracing::info!(title = %config.application.title, "Starting console");

    let settings = open_settings(&config);
    let geometry = settings.load_geometry(WindowGeometry::from(&config.window));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("bench-console-io")
        .enable_all()
        .build()?;

    let title = config.application.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&title)
            .with_inner_size(geometry.size)
            .with_position(geometry.pos),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            Ok(Box::new(ConsoleApp::new(
                cc, config, settings, geometry, runtime,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("GUI terminated: {e}"))?;

    tracing::info!("Console closed");
    Ok(())
}
