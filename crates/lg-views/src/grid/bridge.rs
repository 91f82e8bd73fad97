//! Grid data bridge
//!
//! Serves the grid's block requests through the server channel. Every request
//! carries a [`RequestToken`]; a reply is only applied while its generation is
//! still the generation of the bridge's filters and the bridge has not been
//! detached from its widget.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

use lg_core::channel::{GET_ROWS, ROW_SELECTED};
use lg_core::events::events::{RowsFailed, RowsLoaded, RowsRequested, StaleReplyDropped};
use lg_core::{
    Channel, ChannelError, ElementId, EventBus, FilterStateHolder, RequestToken, Row,
    RowWindowReply, RowWindowRequest,
};

use super::overlay::LoadingOverlay;
use crate::widget::{BlockResponder, GetRowsParams, RowClickHandler, RowDatasource};

struct BridgeInner {
    element: ElementId,
    channel: Arc<dyn Channel>,
    filters: FilterStateHolder,
    overlay: LoadingOverlay,
    events: EventBus,
    runtime_handle: tokio::runtime::Handle,
    hide_delay: Duration,
    next_seq: AtomicU64,
    detached: AtomicBool,
}

/// Row source handed to one grid widget
#[derive(Clone)]
pub struct GridDataBridge {
    inner: Arc<BridgeInner>,
}

impl GridDataBridge {
    pub fn new(
        element: ElementId,
        channel: Arc<dyn Channel>,
        filters: FilterStateHolder,
        overlay: LoadingOverlay,
        events: EventBus,
        runtime_handle: tokio::runtime::Handle,
        hide_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                element,
                channel,
                filters,
                overlay,
                events,
                runtime_handle,
                hide_delay,
                next_seq: AtomicU64::new(0),
                detached: AtomicBool::new(false),
            }),
        }
    }

    /// Stop applying replies; called when the owning widget is destroyed
    pub fn detach(&self) {
        self.inner.detached.store(true, Ordering::SeqCst);
    }

    /// Number of requests issued so far
    pub fn requests_issued(&self) -> u64 {
        self.inner.next_seq.load(Ordering::SeqCst)
    }
}

impl RowDatasource for GridDataBridge {
    fn get_rows(&self, params: GetRowsParams) {
        let inner = &self.inner;
        let GetRowsParams {
            start_row,
            end_row,
            sort_model,
            responder,
        } = params;

        // Filters are read now, not when the widget queued the block
        let (filters, generation) = inner.filters.snapshot();
        let seq = inner.next_seq.fetch_add(1, Ordering::SeqCst);
        let token = RequestToken::new(generation, seq);

        let payload = match RowWindowRequest::new(token, start_row, end_row, sort_model, filters)
            .and_then(|request| request.to_payload())
        {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Rejecting row request {} on {}: {}", token, inner.element, e);
                inner.fail(token, responder, e.to_string());
                return;
            }
        };

        debug!("get_rows {} on {}: {}", token, inner.element, payload);
        inner.events.publish(RowsRequested {
            element: inner.element.clone(),
            token,
            start_row,
            end_row,
        });

        let inner = self.inner.clone();
        self.inner.runtime_handle.spawn(async move {
            let reply = inner.channel.request(GET_ROWS, payload).await;
            inner.resolve(token, reply, responder);
        });
    }
}

impl RowClickHandler for GridDataBridge {
    fn row_clicked(&self, row: &Row) {
        let Some(uuid) = row.get("uuid").filter(|v| is_truthy(v)) else {
            return;
        };

        if let Err(e) = self
            .inner
            .channel
            .push(ROW_SELECTED, json!({ "uuid": uuid }))
        {
            warn!("Failed to push {} from {}: {}", ROW_SELECTED, self.inner.element, e);
        }
    }
}

impl BridgeInner {
    fn is_stale(&self, token: RequestToken) -> bool {
        self.detached.load(Ordering::SeqCst) || token.generation != self.filters.generation()
    }

    fn resolve(
        &self,
        token: RequestToken,
        reply: Result<Value, ChannelError>,
        responder: BlockResponder,
    ) {
        if self.is_stale(token) {
            debug!("Dropping stale reply {} on {}", token, self.element);
            self.events.publish(StaleReplyDropped {
                element: self.element.clone(),
                token,
            });
            return;
        }

        let value = match reply {
            Ok(value) => value,
            Err(e) => {
                warn!("Row request {} on {} failed: {}", token, self.element, e);
                self.fail(token, responder, e.to_string());
                return;
            }
        };

        match RowWindowReply::from_value(&value).into_block() {
            Some(block) => {
                self.events.publish(RowsLoaded {
                    element: self.element.clone(),
                    token,
                    row_count: block.rows.len(),
                    total_rows: block.row_count,
                });
                responder.success(block);
                self.overlay.hide_after(self.hide_delay);
            }
            None => {
                warn!("Invalid reply for {} on {}: {}", token, self.element, value);
                self.fail(token, responder, "malformed reply".to_string());
            }
        }
    }

    fn fail(&self, token: RequestToken, responder: BlockResponder, reason: String) {
        self.events.publish(RowsFailed {
            element: self.element.clone(),
            token,
            reason,
        });
        responder.fail();
        self.overlay.hide();
    }
}

/// Truthiness of a JSON value as the page scripts see it
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
