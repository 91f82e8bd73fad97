//! Widget bridges for server-driven pages
//!
//! Hooks own one widget per page element and translate server signals into
//! widget calls. The grid hook additionally serves the widget's row requests
//! through the server channel.

pub mod chart;
pub mod grid;
mod hooks;
mod widget;

#[cfg(test)]
mod testing;

pub use chart::ChartHook;
pub use grid::{ColumnType, ColumnTypes, GridDataBridge, GridHook, LoadingOverlay, OverlayState};
pub use hooks::{Hook, HookRegistry};
pub use widget::{
    BlockOutcome, BlockResponder, ChartFactory, ChartOptions, ChartWidget, GetRowsParams,
    GridFactory, GridOptions, GridWidget, OverlayStyle, OverlaySurface, RowClickHandler,
    RowDatasource, RowModelType, SeriesOptions,
};

use std::sync::Arc;

use lg_core::{BridgeSettings, Channel, EventBus};

/// Collaborators shared by every hook on a page
#[derive(Clone)]
pub struct HookContext {
    /// Connection to the server
    pub channel: Arc<dyn Channel>,

    /// Lifecycle and row traffic events
    pub events: EventBus,

    /// Bridge settings
    pub settings: Arc<BridgeSettings>,

    /// Tokio runtime handle used for replies and deferred work
    pub runtime_handle: tokio::runtime::Handle,
}

impl HookContext {
    pub fn new(
        channel: Arc<dyn Channel>,
        settings: BridgeSettings,
        runtime_handle: tokio::runtime::Handle,
    ) -> Self {
        Self {
            channel,
            events: EventBus::new(),
            settings: Arc::new(settings),
            runtime_handle,
        }
    }
}
