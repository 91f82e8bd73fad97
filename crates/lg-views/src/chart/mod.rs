//! Chart hook
//!
//! Charts have no incremental protocol: every dataset replaces the widget
//! outright.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use lg_core::config::ChartSettings;
use lg_core::events::events::{ChartBuilt, ChartDestroyed};
use lg_core::{ElementId, EventBus, Result, Signal, WidgetId};

use crate::hooks::Hook;
use crate::widget::{ChartFactory, ChartOptions, ChartWidget};
use crate::HookContext;

/// Hook managing the chart on one page element
pub struct ChartHook {
    element: ElementId,
    settings: ChartSettings,
    events: EventBus,
    factory: Arc<dyn ChartFactory>,
    chart: Option<Box<dyn ChartWidget>>,
}

impl ChartHook {
    pub fn mount(element: ElementId, ctx: &HookContext, factory: Arc<dyn ChartFactory>) -> Self {
        debug!("Mounted chart hook on {}", element);
        Self {
            element,
            settings: ctx.settings.chart.clone(),
            events: ctx.events.clone(),
            factory,
            chart: None,
        }
    }

    /// Id of the live chart, if any
    pub fn widget_id(&self) -> Option<WidgetId> {
        self.chart.as_ref().map(|c| c.id())
    }

    /// Destroy any live chart and build a new one showing `data`
    pub fn replace(&mut self, data: Vec<Value>) -> Result<()> {
        self.teardown();

        let point_count = data.len();
        let chart = self
            .factory
            .create_chart(&self.element, ChartOptions::new(&self.settings, data))?;

        info!("Built chart {} on {} with {} points", chart.id(), self.element, point_count);
        self.events.publish(ChartBuilt {
            element: self.element.clone(),
            widget: chart.id(),
            point_count,
        });

        self.chart = Some(chart);
        Ok(())
    }

    /// Destroy the chart if there is one
    pub fn teardown(&mut self) {
        if let Some(mut chart) = self.chart.take() {
            let widget = chart.id();
            chart.destroy();
            self.events.publish(ChartDestroyed {
                element: self.element.clone(),
                widget,
            });
        }
    }
}

impl Hook for ChartHook {
    fn name(&self) -> &'static str {
        "AgChart"
    }

    fn accepts(&self, signal: &Signal) -> bool {
        !signal.is_grid()
    }

    fn handle_signal(&mut self, signal: Signal) -> Result<()> {
        match signal {
            Signal::LoadChart(chart) | Signal::UpdateChart(chart) => self.replace(chart.data),
            other => {
                debug!("Chart hook on {} ignoring {}", self.element, other.name());
                Ok(())
            }
        }
    }

    fn destroyed(&mut self) {
        self.teardown();
    }
}

impl Drop for ChartHook {
    fn drop(&mut self) {
        self.teardown();
    }
}
