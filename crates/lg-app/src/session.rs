//! Scripted page session
//!
//! Mounts a grid and a chart, then plays the server side of a page visit:
//! load both widgets, refresh the chart, select a row, filter the grid and
//! finally remove the elements.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde_json::json;
use tracing::info;

use lg_core::events::events::{GridBuilt, OverlayChanged, RowsFailed, RowsLoaded, StaleReplyDropped};
use lg_core::{AnchorSource, BridgeSettings, SocketConfig};
use lg_views::{ChartHook, GridHook, Hook, HookContext, HookRegistry};

use crate::demo::DemoServer;
use crate::headless::{HeadlessChartFactory, HeadlessGridFactory, LogOverlay};

const GRID_ELEMENT: &str = "users-grid";
const CHART_ELEMENT: &str = "signups-chart";

/// What happened during a session
#[derive(Debug, Default, Clone)]
pub struct SessionReport {
    pub grids_built: usize,
    pub blocks_loaded: usize,
    pub blocks_failed: usize,
    pub stale_replies: usize,
    pub overlay_shown: usize,
    pub rows_after_filter: usize,
    pub chart_points: usize,
    pub selected: Vec<String>,
}

/// Run the scripted session against an in-memory server
pub async fn run(settings: BridgeSettings, anchors: &dyn AnchorSource) -> Result<SessionReport> {
    let socket = SocketConfig::from_anchors(anchors, &settings.socket)
        .context("Cannot open the live connection")?;
    info!(
        "Connecting to {} (long-poll fallback after {}ms)",
        socket.path, socket.long_poll_fallback_ms
    );

    let latency = Duration::from_millis(40);
    let server = Arc::new(DemoServer::new(500, latency));
    let ctx = HookContext::new(
        server.clone(),
        settings.clone(),
        tokio::runtime::Handle::current(),
    );
    let report = Arc::new(Mutex::new(SessionReport::default()));
    track(&ctx, &report);

    let grids = Arc::new(HeadlessGridFactory::default());
    let charts = Arc::new(HeadlessChartFactory::default());
    let mut registry = registry(&ctx, grids.clone(), charts.clone());

    registry.mount(GRID_ELEMENT, "AgGrid")?;
    registry.mount(CHART_ELEMENT, "AgChart")?;

    // Let replies and the overlay delay play out between signals
    let settle = latency * 2 + settings.grid.overlay_hide_delay();

    registry.broadcast(
        "load_grid",
        json!({
            "gridDefs": DemoServer::column_defs(),
            "defaultColDef": {"sortable": true, "resizable": true},
            "filters": null,
        }),
    )?;
    registry.broadcast("load_chart", json!({ "data": DemoServer::chart_data(1) }))?;
    tokio::time::sleep(settle).await;

    registry.broadcast("update_chart", json!({ "data": DemoServer::chart_data(2) }))?;

    if !grids.click_row(0) {
        info!("No rows visible to select");
    }

    registry.broadcast("update_grid", json!({ "filters": {"status": "active"} }))?;
    tokio::time::sleep(settle + settings.grid.frame_interval()).await;

    let rows_after_filter = grids.visible_rows().len();
    let chart_points = charts.latest().map(|c| c.data.len()).unwrap_or(0);

    registry.unmount_all();

    let mut report = report.lock().clone();
    report.rows_after_filter = rows_after_filter;
    report.chart_points = chart_points;
    report.selected = server.selected();
    Ok(report)
}

fn registry(
    ctx: &HookContext,
    grids: Arc<HeadlessGridFactory>,
    charts: Arc<HeadlessChartFactory>,
) -> HookRegistry {
    let mut registry = HookRegistry::new();

    let grid_ctx = ctx.clone();
    registry.register("AgGrid", move |element| {
        let overlay = Arc::new(LogOverlay::new(element.clone()));
        let hook = GridHook::mount(element, grid_ctx.clone(), grids.clone(), overlay);
        Box::new(hook) as Box<dyn Hook>
    });

    let chart_ctx = ctx.clone();
    registry.register("AgChart", move |element| {
        Box::new(ChartHook::mount(element, &chart_ctx, charts.clone())) as Box<dyn Hook>
    });

    registry
}

fn track(ctx: &HookContext, report: &Arc<Mutex<SessionReport>>) {
    let r = report.clone();
    ctx.events.subscribe_fn(move |_: &GridBuilt| r.lock().grids_built += 1);
    let r = report.clone();
    ctx.events.subscribe_fn(move |_: &RowsLoaded| r.lock().blocks_loaded += 1);
    let r = report.clone();
    ctx.events.subscribe_fn(move |_: &RowsFailed| r.lock().blocks_failed += 1);
    let r = report.clone();
    ctx.events.subscribe_fn(move |_: &StaleReplyDropped| r.lock().stale_replies += 1);
    let r = report.clone();
    ctx.events.subscribe_fn(move |e: &OverlayChanged| {
        if e.visible {
            r.lock().overlay_shown += 1;
        }
    });
}
