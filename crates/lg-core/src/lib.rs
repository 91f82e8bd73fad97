//! Core functionality for the live grid bridge
//!
//! This crate provides the protocol types, filter state, inbound signal
//! decoding and the outbound channel abstraction shared by the widget bridges.

pub mod channel;
pub mod config;
pub mod error;
pub mod events;
pub mod filters;
pub mod protocol;
pub mod signals;
pub mod socket;

// Re-export commonly used types
pub use channel::Channel;
pub use config::{BridgeSettings, ChartSettings, GridSettings, SocketSettings};
pub use error::{BridgeError, ChannelError, Result};
pub use events::EventBus;
pub use filters::{FilterSpec, FilterState, FilterStateHolder};
pub use protocol::{
    ColumnId, RequestToken, Row, RowBlock, RowWindowReply, RowWindowRequest, SortDirection,
    SortSpec,
};
pub use signals::Signal;
pub use socket::{AnchorSource, SocketConfig};

/// Identifier of the page element a hook is mounted on
pub type ElementId = String;

/// Identifier of one live widget instance
pub type WidgetId = uuid::Uuid;
