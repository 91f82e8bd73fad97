//! Main application entry point

use anyhow::{Context, Result};
use tracing::info;

use lg_core::BridgeSettings;

mod demo;
mod headless;
mod session;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting live grid session");

    let settings = match std::env::args().nth(1) {
        Some(path) => BridgeSettings::load(&path)
            .with_context(|| format!("Failed to load settings from {}", path))?,
        None => BridgeSettings::default(),
    };

    // All hook work runs on one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    let anchors = demo::page_anchors();
    let report = runtime.block_on(session::run(settings, &anchors))?;

    info!(
        "Session finished: {} grid(s), {} block(s) loaded, {} failed, {} stale, \
         {} row(s) after filtering, {} chart point(s)",
        report.grids_built,
        report.blocks_loaded,
        report.blocks_failed,
        report.stale_replies,
        report.rows_after_filter,
        report.chart_points
    );
    for uuid in &report.selected {
        info!("Selected row {}", uuid);
    }

    Ok(())
}
