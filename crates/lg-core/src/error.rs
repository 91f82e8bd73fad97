//! Error types for the bridge crates

use thiserror::Error;

/// Errors that can occur while handling signals and widget lifecycles
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown signal: {0}")]
    UnknownSignal(String),

    #[error("Unknown hook: {0}")]
    UnknownHook(String),

    #[error("No hook mounted on element: {0}")]
    UnknownElement(String),

    #[error("Malformed payload for '{signal}': {reason}")]
    MalformedSignal { signal: String, reason: String },

    #[error("Invalid row window: start {start} must be below end {end}")]
    InvalidWindow { start: u64, end: u64 },

    #[error("Missing required page anchor: {0}")]
    MissingAnchor(String),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Widget error: {0}")]
    Widget(String),
}

/// Transport failures reported by a [`crate::Channel`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel closed")]
    Closed,

    #[error("reply dropped before delivery")]
    ReplyDropped,

    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
