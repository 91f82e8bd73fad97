//! Grid lifecycle hook
//!
//! Owns at most one grid widget per element. `load_grid` always tears the
//! current instance down and builds a fresh one; `update_grid` swaps the
//! filters and makes the widget refetch.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use lg_core::config::GridSettings;
use lg_core::events::events::{GridBuilt, GridDestroyed};
use lg_core::signals::{LoadGrid, UpdateGrid};
use lg_core::{ElementId, FilterStateHolder, Result, Signal, WidgetId};

use super::bridge::GridDataBridge;
use super::column_types::ColumnTypes;
use super::overlay::{LoadingOverlay, OverlayState};
use crate::hooks::Hook;
use crate::widget::{
    GridFactory, GridOptions, GridWidget, OverlayStyle, OverlaySurface, RowModelType,
};
use crate::HookContext;

/// State that lives exactly as long as one grid widget
struct GridInstance {
    widget: Box<dyn GridWidget>,
    bridge: GridDataBridge,
    filters: FilterStateHolder,
    overlay: LoadingOverlay,
}

/// Hook managing the grid on one page element
pub struct GridHook {
    element: ElementId,
    ctx: HookContext,
    settings: GridSettings,
    factory: Arc<dyn GridFactory>,
    surface: Arc<dyn OverlaySurface>,
    instance: Arc<Mutex<Option<GridInstance>>>,
}

impl GridHook {
    /// Mount the hook on an element and attach its overlay
    pub fn mount(
        element: ElementId,
        ctx: HookContext,
        factory: Arc<dyn GridFactory>,
        surface: Arc<dyn OverlaySurface>,
    ) -> Self {
        let settings = ctx.settings.grid.clone();

        surface.attach(&OverlayStyle {
            message: settings.overlay_message.clone(),
            min_height_px: settings.min_height_px,
            z_index: 50,
            blocks_pointer: true,
        });
        surface.set_visible(false);

        debug!("Mounted grid hook on {}", element);

        Self {
            element,
            ctx,
            settings,
            factory,
            surface,
            instance: Arc::new(Mutex::new(None)),
        }
    }

    /// Id of the live widget, if any
    pub fn widget_id(&self) -> Option<WidgetId> {
        self.instance.lock().as_ref().map(|i| i.widget.id())
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.instance
            .lock()
            .as_ref()
            .map(|i| i.overlay.state())
            .unwrap_or_default()
    }

    /// Rebuild the widget from a full grid definition
    pub fn load_grid(&self, load: LoadGrid) -> Result<()> {
        let mut slot = self.instance.lock();

        if let Some(old) = slot.take() {
            self.destroy_instance(old);
        }

        let filters = FilterStateHolder::new(load.filters.unwrap_or_default());
        let overlay = LoadingOverlay::new(
            self.element.clone(),
            self.surface.clone(),
            self.ctx.events.clone(),
            self.ctx.runtime_handle.clone(),
        );
        let bridge = GridDataBridge::new(
            self.element.clone(),
            self.ctx.channel.clone(),
            filters.clone(),
            overlay.clone(),
            self.ctx.events.clone(),
            self.ctx.runtime_handle.clone(),
            self.settings.overlay_hide_delay(),
        );

        let column_count = load.column_defs.len();
        let options = GridOptions {
            row_model: RowModelType::Infinite,
            pagination: self.settings.pagination,
            page_size: self.settings.page_size,
            cache_block_size: self.settings.cache_block_size,
            column_defs: load.column_defs,
            default_col_def: load.default_col_def,
            column_types: ColumnTypes::standard(),
            datasource: Arc::new(bridge.clone()),
            on_row_clicked: Arc::new(bridge.clone()),
        };

        let widget = match self.factory.create_grid(&self.element, options) {
            Ok(widget) => widget,
            Err(e) => {
                bridge.detach();
                overlay.retire();
                return Err(e);
            }
        };

        info!(
            "Built grid {} on {} with {} columns",
            widget.id(),
            self.element,
            column_count
        );
        self.ctx.events.publish(GridBuilt {
            element: self.element.clone(),
            widget: widget.id(),
            column_count,
        });

        *slot = Some(GridInstance {
            widget,
            bridge,
            filters,
            overlay,
        });

        Ok(())
    }

    /// Replace the filters and make the widget refetch from row 0
    pub fn update_grid(&self, update: UpdateGrid) {
        let widget_id = {
            let slot = self.instance.lock();
            let Some(instance) = slot.as_ref() else {
                warn!("Ignoring update_grid on {}: no grid loaded", self.element);
                return;
            };

            let generation = instance
                .filters
                .replace(update.filters.unwrap_or_default());
            debug!("Filters on {} now at generation {}", self.element, generation);

            instance.overlay.show();
            instance.overlay.force_layout();
            instance.widget.id()
        };

        // Purge on the next frame so the overlay gets painted first
        let slot = self.instance.clone();
        let frame = self.settings.frame_interval();
        self.ctx.runtime_handle.spawn(async move {
            tokio::time::sleep(frame).await;
            let mut slot = slot.lock();
            match slot.as_mut() {
                Some(instance) if instance.widget.id() == widget_id => {
                    instance.widget.purge_infinite_cache();
                }
                _ => debug!("Grid {} replaced before its cache purge", widget_id),
            }
        });
    }

    /// Destroy the widget if there is one
    pub fn teardown(&self) {
        if let Some(instance) = self.instance.lock().take() {
            self.destroy_instance(instance);
        }
    }

    fn destroy_instance(&self, mut instance: GridInstance) {
        let widget_id = instance.widget.id();
        instance.bridge.detach();
        instance.overlay.retire();
        instance.widget.destroy();

        info!("Destroyed grid {} on {}", widget_id, self.element);
        self.ctx.events.publish(GridDestroyed {
            element: self.element.clone(),
            widget: widget_id,
        });
    }
}

impl Hook for GridHook {
    fn name(&self) -> &'static str {
        "AgGrid"
    }

    fn accepts(&self, signal: &Signal) -> bool {
        signal.is_grid()
    }

    fn handle_signal(&mut self, signal: Signal) -> Result<()> {
        match signal {
            Signal::LoadGrid(load) => self.load_grid(load),
            Signal::UpdateGrid(update) => {
                self.update_grid(update);
                Ok(())
            }
            other => {
                debug!("Grid hook on {} ignoring {}", self.element, other.name());
                Ok(())
            }
        }
    }

    fn destroyed(&mut self) {
        self.teardown();
    }
}

impl Drop for GridHook {
    fn drop(&mut self) {
        self.teardown();
    }
}
