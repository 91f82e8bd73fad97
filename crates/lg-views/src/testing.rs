//! Test doubles for the channel, the overlay surface and the widgets

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use uuid::Uuid;

use lg_core::{Channel, ChannelError, ElementId, Result, WidgetId};

use crate::widget::{
    BlockOutcome, BlockResponder, ChartFactory, ChartOptions, ChartWidget, GetRowsParams,
    GridFactory, GridOptions, GridWidget, OverlayStyle, OverlaySurface,
};

/// Let spawned tasks run until they block again
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// A request parked until the test replies to it
pub struct PendingRequest {
    pub event: String,
    pub payload: Value,
    reply: oneshot::Sender<std::result::Result<Value, ChannelError>>,
}

impl PendingRequest {
    pub fn reply(self, value: Value) {
        let _ = self.reply.send(Ok(value));
    }

    pub fn fail(self, error: ChannelError) {
        let _ = self.reply.send(Err(error));
    }
}

/// Channel whose replies are delivered by hand, in any order
#[derive(Default)]
pub struct ScriptedChannel {
    pending: Mutex<Vec<PendingRequest>>,
    pushed: Mutex<Vec<(String, Value)>>,
}

impl ScriptedChannel {
    pub fn take_pending(&self) -> Vec<PendingRequest> {
        std::mem::take(&mut *self.pending.lock())
    }

    pub fn pushed(&self) -> Vec<(String, Value)> {
        self.pushed.lock().clone()
    }
}

#[async_trait]
impl Channel for ScriptedChannel {
    async fn request(
        &self,
        event: &str,
        payload: Value,
    ) -> std::result::Result<Value, ChannelError> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().push(PendingRequest {
            event: event.to_string(),
            payload,
            reply: tx,
        });
        rx.await.unwrap_or(Err(ChannelError::ReplyDropped))
    }

    fn push(&self, event: &str, payload: Value) -> std::result::Result<(), ChannelError> {
        self.pushed.lock().push((event.to_string(), payload));
        Ok(())
    }
}

/// Overlay surface that records what it was told
#[derive(Default)]
pub struct RecordingSurface {
    visible: AtomicBool,
    layouts: AtomicUsize,
    style: Mutex<Option<OverlayStyle>>,
}

impl RecordingSurface {
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn layouts(&self) -> usize {
        self.layouts.load(Ordering::SeqCst)
    }

    pub fn style(&self) -> Option<OverlayStyle> {
        self.style.lock().clone()
    }
}

impl OverlaySurface for RecordingSurface {
    fn attach(&self, style: &OverlayStyle) {
        *self.style.lock() = Some(style.clone());
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    fn force_layout(&self) {
        self.layouts.fetch_add(1, Ordering::SeqCst);
    }
}

/// How a block request looks from the widget's side
#[derive(Debug, Clone, PartialEq)]
pub enum BlockState {
    Pending,
    Loaded(usize),
    Failed,
    Abandoned,
}

/// Everything a fake grid saw, kept after the grid is destroyed
pub struct FakeGridState {
    pub id: WidgetId,
    pub options: GridOptions,
    pub purges: AtomicUsize,
    pub destroyed: AtomicBool,
    blocks: Mutex<Vec<(oneshot::Receiver<BlockOutcome>, Option<BlockState>)>>,
}

impl FakeGridState {
    /// Ask the datasource for a block, like the widget does while scrolling
    pub fn request_block(&self, start_row: u64, end_row: u64) {
        let (responder, rx) = BlockResponder::channel();
        self.blocks.lock().push((rx, None));
        self.options.datasource.get_rows(GetRowsParams {
            start_row,
            end_row,
            sort_model: Vec::new(),
            responder,
        });
    }

    pub fn blocks(&self) -> Vec<BlockState> {
        let mut blocks = self.blocks.lock();
        blocks
            .iter_mut()
            .map(|(rx, resolved)| {
                if resolved.is_none() {
                    *resolved = match rx.try_recv() {
                        Ok(BlockOutcome::Loaded(block)) => {
                            Some(BlockState::Loaded(block.rows.len()))
                        }
                        Ok(BlockOutcome::Failed) => Some(BlockState::Failed),
                        Err(oneshot::error::TryRecvError::Closed) => Some(BlockState::Abandoned),
                        Err(oneshot::error::TryRecvError::Empty) => None,
                    };
                }
                resolved.clone().unwrap_or(BlockState::Pending)
            })
            .collect()
    }

    pub fn purges(&self) -> usize {
        self.purges.load(Ordering::SeqCst)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

struct FakeGrid {
    state: Arc<FakeGridState>,
    live: Arc<AtomicUsize>,
}

impl GridWidget for FakeGrid {
    fn id(&self) -> WidgetId {
        self.state.id
    }

    fn purge_infinite_cache(&mut self) {
        self.state.purges.fetch_add(1, Ordering::SeqCst);
        self.state
            .request_block(0, self.state.options.cache_block_size);
    }

    fn destroy(&mut self) {
        if !self.state.destroyed.swap(true, Ordering::SeqCst) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Grid factory whose grids fetch their first block on construction
#[derive(Default)]
pub struct FakeGridFactory {
    grids: Mutex<Vec<Arc<FakeGridState>>>,
    live: Arc<AtomicUsize>,
    max_live: AtomicUsize,
    fail_next: AtomicBool,
}

impl FakeGridFactory {
    pub fn grids(&self) -> Vec<Arc<FakeGridState>> {
        self.grids.lock().clone()
    }

    pub fn latest(&self) -> Option<Arc<FakeGridState>> {
        self.grids.lock().last().cloned()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of grids alive at the same time
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl GridFactory for FakeGridFactory {
    fn create_grid(
        &self,
        _element: &ElementId,
        options: GridOptions,
    ) -> Result<Box<dyn GridWidget>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(lg_core::BridgeError::Widget("grid construction failed".to_string()));
        }

        let state = Arc::new(FakeGridState {
            id: Uuid::new_v4(),
            options,
            purges: AtomicUsize::new(0),
            destroyed: AtomicBool::new(false),
            blocks: Mutex::new(Vec::new()),
        });
        self.grids.lock().push(state.clone());

        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);

        // Initial render
        state.request_block(0, state.options.cache_block_size);

        Ok(Box::new(FakeGrid {
            state,
            live: self.live.clone(),
        }))
    }
}

/// Everything a fake chart saw
pub struct FakeChartState {
    pub id: WidgetId,
    pub options: ChartOptions,
    pub destroyed: AtomicBool,
}

impl FakeChartState {
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

struct FakeChart {
    state: Arc<FakeChartState>,
}

impl ChartWidget for FakeChart {
    fn id(&self) -> WidgetId {
        self.state.id
    }

    fn destroy(&mut self) {
        self.state.destroyed.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeChartFactory {
    charts: Mutex<Vec<Arc<FakeChartState>>>,
}

impl FakeChartFactory {
    pub fn charts(&self) -> Vec<Arc<FakeChartState>> {
        self.charts.lock().clone()
    }

    pub fn live(&self) -> Vec<Arc<FakeChartState>> {
        self.charts
            .lock()
            .iter()
            .filter(|c| !c.is_destroyed())
            .cloned()
            .collect()
    }
}

impl ChartFactory for FakeChartFactory {
    fn create_chart(
        &self,
        _element: &ElementId,
        options: ChartOptions,
    ) -> Result<Box<dyn ChartWidget>> {
        let state = Arc::new(FakeChartState {
            id: Uuid::new_v4(),
            options,
            destroyed: AtomicBool::new(false),
        });
        self.charts.lock().push(state.clone());
        Ok(Box::new(FakeChart { state }))
    }
}
