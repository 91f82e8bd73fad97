use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// Bus for widget lifecycle and row traffic events
///
/// Handlers run synchronously inside `publish` and must not publish
/// themselves.
#[derive(Clone)]
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Events emitted by the grid and chart hooks
pub mod events {
    use super::Event;
    use crate::protocol::RequestToken;
    use crate::{ElementId, WidgetId};

    /// A grid widget was constructed
    #[derive(Debug, Clone)]
    pub struct GridBuilt {
        pub element: ElementId,
        pub widget: WidgetId,
        pub column_count: usize,
    }

    /// A grid widget was destroyed
    #[derive(Debug, Clone)]
    pub struct GridDestroyed {
        pub element: ElementId,
        pub widget: WidgetId,
    }

    /// A chart widget was constructed
    #[derive(Debug, Clone)]
    pub struct ChartBuilt {
        pub element: ElementId,
        pub widget: WidgetId,
        pub point_count: usize,
    }

    /// A chart widget was destroyed
    #[derive(Debug, Clone)]
    pub struct ChartDestroyed {
        pub element: ElementId,
        pub widget: WidgetId,
    }

    /// A row window request was sent
    #[derive(Debug, Clone)]
    pub struct RowsRequested {
        pub element: ElementId,
        pub token: RequestToken,
        pub start_row: u64,
        pub end_row: u64,
    }

    /// Rows were handed to the widget
    #[derive(Debug, Clone)]
    pub struct RowsLoaded {
        pub element: ElementId,
        pub token: RequestToken,
        pub row_count: usize,
        pub total_rows: Option<u64>,
    }

    /// The widget was told a request failed
    #[derive(Debug, Clone)]
    pub struct RowsFailed {
        pub element: ElementId,
        pub token: RequestToken,
        pub reason: String,
    }

    /// A reply arrived for a request that is no longer current
    #[derive(Debug, Clone)]
    pub struct StaleReplyDropped {
        pub element: ElementId,
        pub token: RequestToken,
    }

    /// The loading overlay changed visibility
    #[derive(Debug, Clone)]
    pub struct OverlayChanged {
        pub element: ElementId,
        pub visible: bool,
    }

    // Implement Event trait for all event types
    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        GridBuilt,
        GridDestroyed,
        ChartBuilt,
        ChartDestroyed,
        RowsRequested,
        RowsLoaded,
        RowsFailed,
        StaleReplyDropped,
        OverlayChanged
    );
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Subscribe a closure that receives the concrete event type
    pub fn subscribe_fn<E, F>(&self, mut f: F)
    where
        E: Event,
        F: FnMut(&E) + Send + Sync + 'static,
    {
        self.subscribe::<E>(handler_from_fn(move |event| {
            if let Some(event) = event.as_any().downcast_ref::<E>() {
                f(event);
            }
        }));
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

#[cfg(test)]
mod tests {
    use super::events::{GridBuilt, GridDestroyed};
    use super::*;

    #[test]
    fn test_typed_subscription() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe_fn(move |event: &GridBuilt| sink.lock().push(event.column_count));

        bus.publish(GridBuilt {
            element: "orders".to_string(),
            widget: uuid::Uuid::new_v4(),
            column_count: 3,
        });
        bus.publish(GridDestroyed {
            element: "orders".to_string(),
            widget: uuid::Uuid::new_v4(),
        });

        assert_eq!(*seen.lock(), vec![3]);
    }

    #[test]
    fn test_clones_share_handlers() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));

        let sink = count.clone();
        bus.subscribe_fn(move |_: &GridDestroyed| *sink.lock() += 1);

        let other = bus.clone();
        other.publish(GridDestroyed {
            element: "a".to_string(),
            widget: uuid::Uuid::new_v4(),
        });

        assert_eq!(*count.lock(), 1);
    }
}
