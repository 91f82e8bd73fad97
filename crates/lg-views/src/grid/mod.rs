//! Infinite grid support: row bridge, loading overlay and lifecycle hook

mod bridge;
mod column_types;
mod hook;
mod overlay;

pub use bridge::GridDataBridge;
pub use column_types::{ColumnType, ColumnTypes};
pub use hook::GridHook;
pub use overlay::{LoadingOverlay, OverlayState};
