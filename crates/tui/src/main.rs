mod app;
mod big_numerals;

use anyhow::Result;
use std::fs::{self, OpenOptions};

use timestui_core::config::{self, AppConfig};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config_path = config::ensure_default_config()?;
    tracing::debug!(path = %config_path.display(), "configuration ready");
    let config = AppConfig::load()?;

    let mut app = app::PracticeApp::new(config);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("timestui.log");

    let env_filter = EnvFilter::from_default_env();

    // No stdout layer: the TUI owns the terminal for its whole lifetime.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
