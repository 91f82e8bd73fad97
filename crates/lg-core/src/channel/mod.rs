//! Outbound transport to the server
//!
//! The channel is an external collaborator: a reliable, ordered request/reply
//! connection. Correlating a reply with its request is the channel's job; the
//! bridges only ever await the future returned for their own request.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ChannelError;

/// Event name of the row-window request
pub const GET_ROWS: &str = "get_rows";

/// Event name pushed when a row carrying a `uuid` is activated
pub const ROW_SELECTED: &str = "row-selected";

/// Trait for server connections
#[async_trait]
pub trait Channel: Send + Sync {
    /// Push an event and wait for its single reply.
    ///
    /// A reply that never arrives leaves the returned future pending forever;
    /// timeouts belong to the implementation.
    async fn request(&self, event: &str, payload: Value) -> Result<Value, ChannelError>;

    /// Push an event without expecting a reply
    fn push(&self, event: &str, payload: Value) -> Result<(), ChannelError>;
}
