//! Headless widget backend
//!
//! Stands in for the browser widgets: grids fetch and "render" rows into the
//! log, charts log their series, and the overlay logs its visibility.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use lg_core::{ElementId, Result, Row, WidgetId};
use lg_views::{
    BlockOutcome, BlockResponder, ChartFactory, ChartOptions, ChartWidget, GetRowsParams,
    GridFactory, GridOptions, GridWidget, OverlayStyle, OverlaySurface,
};

/// Rows currently shown by a headless grid
#[derive(Clone)]
struct GridView {
    element: ElementId,
    options: GridOptions,
    rows: Arc<Mutex<Vec<Row>>>,
}

impl GridView {
    fn fetch_block(&self, start_row: u64) {
        let (responder, rx) = BlockResponder::channel();
        self.options.datasource.get_rows(GetRowsParams {
            start_row,
            end_row: start_row + self.options.cache_block_size,
            sort_model: Vec::new(),
            responder,
        });

        let view = self.clone();
        tokio::spawn(async move {
            match rx.await {
                Ok(BlockOutcome::Loaded(block)) => {
                    view.render(start_row, block.rows, block.row_count)
                }
                Ok(BlockOutcome::Failed) => {
                    warn!("{}: block at {} failed to load", view.element, start_row)
                }
                Err(_) => debug!("{}: block at {} abandoned", view.element, start_row),
            }
        });
    }

    fn render(&self, start_row: u64, rows: Vec<Row>, total: Option<u64>) {
        let page = self.options.page_size as usize;
        info!(
            "{}: rows {}..{} of {} loaded, showing first page of {}",
            self.element,
            start_row,
            start_row + rows.len() as u64,
            total.map(|t| t.to_string()).unwrap_or_else(|| "?".to_string()),
            page.min(rows.len())
        );

        for row in rows.iter().take(3) {
            debug!("{}: {}", self.element, self.format_row(row));
        }

        *self.rows.lock() = rows;
    }

    fn format_row(&self, row: &Row) -> String {
        self.options
            .column_defs
            .iter()
            .filter_map(|def| {
                let field = def.get("field")?.as_str()?;
                Some(self.options.column_types.format_cell(def, &row[field]))
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

struct HeadlessGrid {
    id: WidgetId,
    view: GridView,
}

impl GridWidget for HeadlessGrid {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn purge_infinite_cache(&mut self) {
        debug!("{}: purging cached blocks", self.view.element);
        self.view.rows.lock().clear();
        self.view.fetch_block(0);
    }

    fn destroy(&mut self) {
        self.view.rows.lock().clear();
        info!("{}: grid {} destroyed", self.view.element, self.id);
    }
}

/// Creates headless grids and remembers the latest one
#[derive(Default)]
pub struct HeadlessGridFactory {
    latest: Mutex<Option<GridView>>,
}

impl HeadlessGridFactory {
    /// Rows shown by the most recently built grid
    pub fn visible_rows(&self) -> Vec<Row> {
        self.latest
            .lock()
            .as_ref()
            .map(|view| view.rows.lock().clone())
            .unwrap_or_default()
    }

    /// Simulate a click on a visible row
    pub fn click_row(&self, index: usize) -> bool {
        let Some(view) = self.latest.lock().clone() else {
            return false;
        };
        let row = view.rows.lock().get(index).cloned();
        match row {
            Some(row) => {
                view.options.on_row_clicked.row_clicked(&row);
                true
            }
            None => false,
        }
    }
}

impl GridFactory for HeadlessGridFactory {
    fn create_grid(
        &self,
        element: &ElementId,
        options: GridOptions,
    ) -> Result<Box<dyn GridWidget>> {
        let view = GridView {
            element: element.clone(),
            options,
            rows: Arc::new(Mutex::new(Vec::new())),
        };
        *self.latest.lock() = Some(view.clone());

        view.fetch_block(0);

        Ok(Box::new(HeadlessGrid {
            id: Uuid::new_v4(),
            view,
        }))
    }
}

struct HeadlessChart {
    id: WidgetId,
    element: ElementId,
}

impl ChartWidget for HeadlessChart {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn destroy(&mut self) {
        info!("{}: chart {} destroyed", self.element, self.id);
    }
}

/// Creates headless charts, keeping the dataset of the latest one
#[derive(Default)]
pub struct HeadlessChartFactory {
    latest: Mutex<Option<ChartOptions>>,
}

impl HeadlessChartFactory {
    pub fn latest(&self) -> Option<ChartOptions> {
        self.latest.lock().clone()
    }
}

impl ChartFactory for HeadlessChartFactory {
    fn create_chart(
        &self,
        element: &ElementId,
        options: ChartOptions,
    ) -> Result<Box<dyn ChartWidget>> {
        for series in &options.series {
            info!(
                "{}: {:?} series {} over {} with {} points",
                element,
                series.kind,
                series.y_key,
                series.x_key,
                options.data.len()
            );
        }
        *self.latest.lock() = Some(options);

        Ok(Box::new(HeadlessChart {
            id: Uuid::new_v4(),
            element: element.clone(),
        }))
    }
}

/// Overlay that reports its visibility through the log
pub struct LogOverlay {
    element: ElementId,
}

impl LogOverlay {
    pub fn new(element: ElementId) -> Self {
        Self { element }
    }
}

impl OverlaySurface for LogOverlay {
    fn attach(&self, style: &OverlayStyle) {
        debug!(
            "{}: overlay attached (min height {}px, '{}')",
            self.element, style.min_height_px, style.message
        );
    }

    fn set_visible(&self, visible: bool) {
        if visible {
            info!("{}: loading overlay shown", self.element);
        } else {
            debug!("{}: loading overlay hidden", self.element);
        }
    }

    fn force_layout(&self) {}
}
