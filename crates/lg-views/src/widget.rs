//! Widget abstraction - the fixed API of the grid and chart widgets
//!
//! The widgets themselves render elsewhere; hooks only construct, refresh and
//! destroy them through these traits.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;

use lg_core::config::{ChartSettings, SeriesKind};
use lg_core::signals::ColumnDef;
use lg_core::{ElementId, Result, Row, RowBlock, SortSpec, WidgetId};

use crate::grid::ColumnTypes;

/// Row model of the grid widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowModelType {
    /// Rows are fetched lazily in blocks while scrolling
    Infinite,
}

/// Result of one block request as seen by the widget
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    Loaded(RowBlock),
    Failed,
}

/// Reports the outcome of exactly one block request.
///
/// Reporting consumes the responder. Dropping it unreported tells the widget
/// the block was abandoned.
#[derive(Debug)]
pub struct BlockResponder {
    tx: oneshot::Sender<BlockOutcome>,
}

impl BlockResponder {
    /// Create a responder and the receiver the widget waits on
    pub fn channel() -> (Self, oneshot::Receiver<BlockOutcome>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn success(self, block: RowBlock) {
        // The widget may already be gone
        let _ = self.tx.send(BlockOutcome::Loaded(block));
    }

    pub fn fail(self) {
        let _ = self.tx.send(BlockOutcome::Failed);
    }
}

/// Parameters of one block request issued by the widget
#[derive(Debug)]
pub struct GetRowsParams {
    pub start_row: u64,
    pub end_row: u64,
    pub sort_model: Vec<SortSpec>,
    pub responder: BlockResponder,
}

/// Source of row blocks for an infinite grid
pub trait RowDatasource: Send + Sync {
    /// Start fetching a block; the outcome goes through `params.responder`
    fn get_rows(&self, params: GetRowsParams);
}

/// Receives row activations from the grid
pub trait RowClickHandler: Send + Sync {
    fn row_clicked(&self, row: &Row);
}

/// Construction options of a grid widget
#[derive(Clone)]
pub struct GridOptions {
    pub row_model: RowModelType,
    pub pagination: bool,
    pub page_size: u64,
    pub cache_block_size: u64,
    pub column_defs: Vec<ColumnDef>,
    pub default_col_def: Option<Value>,
    pub column_types: ColumnTypes,
    pub datasource: Arc<dyn RowDatasource>,
    pub on_row_clicked: Arc<dyn RowClickHandler>,
}

/// One live grid widget
pub trait GridWidget: Send {
    fn id(&self) -> WidgetId;

    /// Drop every cached block and fetch again from row 0
    fn purge_infinite_cache(&mut self);

    /// Release all resources held by the widget
    fn destroy(&mut self);
}

/// Creates grid widgets on page elements
pub trait GridFactory: Send + Sync {
    fn create_grid(&self, element: &ElementId, options: GridOptions) -> Result<Box<dyn GridWidget>>;
}

/// One chart series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOptions {
    pub kind: SeriesKind,
    pub x_key: String,
    pub y_key: String,
}

/// Construction options of a chart widget
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub series: Vec<SeriesOptions>,
    pub data: Vec<Value>,
}

impl ChartOptions {
    /// Fixed single-series configuration with the given dataset
    pub fn new(settings: &ChartSettings, data: Vec<Value>) -> Self {
        Self {
            series: vec![SeriesOptions {
                kind: settings.series,
                x_key: settings.x_key.clone(),
                y_key: settings.y_key.clone(),
            }],
            data,
        }
    }
}

/// One live chart widget
pub trait ChartWidget: Send {
    fn id(&self) -> WidgetId;

    fn destroy(&mut self);
}

/// Creates chart widgets on page elements
pub trait ChartFactory: Send + Sync {
    fn create_chart(
        &self,
        element: &ElementId,
        options: ChartOptions,
    ) -> Result<Box<dyn ChartWidget>>;
}

/// Presentation of the loading overlay
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub message: String,

    /// Minimum height of the hosting element
    pub min_height_px: u32,

    /// Stacking order above the widget
    pub z_index: i32,

    /// Whether pointer input is swallowed while visible
    pub blocks_pointer: bool,
}

/// The overlay element layered over a grid
pub trait OverlaySurface: Send + Sync {
    /// Attach the overlay to its host element; called once per mount
    fn attach(&self, style: &OverlayStyle);

    fn set_visible(&self, visible: bool);

    /// Force a style recalculation so a visibility change is rendered
    fn force_layout(&self);
}
