//! Focal Demo - Main Entry Point

use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use focal_demo::{DemoConfig, Step, TodoPage, run_session};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Optional TOML config as the first argument
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => DemoConfig::load(&path)?,
        None => DemoConfig::default(),
    };
    tracing::info!("Starting Focal demo at {}", config.url);

    let mut page = TodoPage::build(&config).context("failed to build the demo page")?;
    let log = run_session(&mut page, &Step::default_script())?;

    tracing::info!(
        "{} steps, {} todos left, {} announcements",
        log.len(),
        page.todos().len(),
        page.runtime().announcer.history().count()
    );
    Ok(())
}
