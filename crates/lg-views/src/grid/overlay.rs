//! Loading overlay state machine
//!
//! `Hidden` until a filter change makes it `Visible`; the next reply hides it
//! again, either immediately (failure) or after a short delay (success) so the
//! widget can finish repainting underneath.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use lg_core::events::events::OverlayChanged;
use lg_core::{ElementId, EventBus};

use crate::widget::OverlaySurface;

/// Visibility of the loading overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Hidden,
    Visible,
}

#[derive(Debug, Default)]
struct OverlayCell {
    state: OverlayState,
    /// Bumped on every transition to `Visible`
    epoch: u64,
    retired: bool,
}

struct OverlayInner {
    element: ElementId,
    surface: Arc<dyn OverlaySurface>,
    events: EventBus,
    runtime_handle: tokio::runtime::Handle,
    cell: Mutex<OverlayCell>,
}

/// Loading overlay of one grid instance
#[derive(Clone)]
pub struct LoadingOverlay {
    inner: Arc<OverlayInner>,
}

impl LoadingOverlay {
    /// Create the overlay of a fresh grid instance, starting hidden
    pub fn new(
        element: ElementId,
        surface: Arc<dyn OverlaySurface>,
        events: EventBus,
        runtime_handle: tokio::runtime::Handle,
    ) -> Self {
        surface.set_visible(false);
        Self {
            inner: Arc::new(OverlayInner {
                element,
                surface,
                events,
                runtime_handle,
                cell: Mutex::new(OverlayCell::default()),
            }),
        }
    }

    pub fn state(&self) -> OverlayState {
        self.inner.cell.lock().state
    }

    pub fn is_visible(&self) -> bool {
        self.state() == OverlayState::Visible
    }

    /// Show the overlay
    pub fn show(&self) {
        {
            let mut cell = self.inner.cell.lock();
            if cell.retired {
                return;
            }
            cell.epoch += 1;
            if cell.state == OverlayState::Visible {
                return;
            }
            cell.state = OverlayState::Visible;
        }
        self.apply(true);
    }

    /// Force the surface to lay out its current visibility
    pub fn force_layout(&self) {
        if !self.inner.cell.lock().retired {
            self.inner.surface.force_layout();
        }
    }

    /// Hide the overlay now
    pub fn hide(&self) {
        {
            let mut cell = self.inner.cell.lock();
            if cell.retired || cell.state == OverlayState::Hidden {
                return;
            }
            cell.state = OverlayState::Hidden;
        }
        self.apply(false);
    }

    /// Hide the overlay after `delay`, unless it is shown again in between
    pub fn hide_after(&self, delay: Duration) {
        let epoch = self.inner.cell.lock().epoch;
        let overlay = self.clone();
        self.inner.runtime_handle.spawn(async move {
            tokio::time::sleep(delay).await;
            overlay.hide_if_epoch(epoch);
        });
    }

    /// Detach from the surface; later transitions are ignored
    pub fn retire(&self) {
        self.inner.cell.lock().retired = true;
    }

    fn hide_if_epoch(&self, epoch: u64) {
        {
            let mut cell = self.inner.cell.lock();
            if cell.retired || cell.state == OverlayState::Hidden {
                return;
            }
            if cell.epoch != epoch {
                debug!("Skipping delayed hide on {}: overlay shown again", self.inner.element);
                return;
            }
            cell.state = OverlayState::Hidden;
        }
        self.apply(false);
    }

    fn apply(&self, visible: bool) {
        self.inner.surface.set_visible(visible);
        self.inner.events.publish(OverlayChanged {
            element: self.inner.element.clone(),
            visible,
        });
    }
}
