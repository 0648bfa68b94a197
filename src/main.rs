//! mdview - A simple viewer for Markdown files.
//!
//! # Usage
//!
//! ```bash
//! mdview README.md
//! mdview CHANGELOG.md NOTES.md
//! MDVIEW_LOG=/tmp/mdview.log mdview README.md
//! ```

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mdview::app::App;
use mdview::config;

/// Environment variable naming a file to write logs to.
const LOG_FILE_ENV: &str = "MDVIEW_LOG";

/// A simple viewer for Markdown files
#[derive(Parser, Debug)]
#[command(name = "mdview", version, about, long_about = None)]
struct Cli {
    /// Markdown files to view; each extra file opens in its own window
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    // The terminal belongs to the UI, so logs only go to stderr when no
    // file is given.
    match std::env::var_os(LOG_FILE_ENV).filter(|v| !v.is_empty()) {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.to_string_lossy()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();

    let mut app = App::new(cli.files).with_settings_path(config::settings_path());

    app.run().context("Application error")
}
