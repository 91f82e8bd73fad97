//! Bridge settings

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// All tunables of the widget bridges
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    pub grid: GridSettings,
    pub chart: ChartSettings,
    pub socket: SocketSettings,
}

/// Grid widget and loading overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Rows shown per page
    pub page_size: u64,

    /// Rows fetched per block request
    pub cache_block_size: u64,

    /// Whether the grid paginates
    pub pagination: bool,

    /// Delay between a successful reply and hiding the overlay
    pub overlay_hide_delay_ms: u64,

    /// Deferral before the cache purge that follows a filter change
    pub frame_interval_ms: u64,

    /// Minimum height of the hosting element
    pub min_height_px: u32,

    /// Label shown on the loading overlay
    pub overlay_message: String,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            page_size: 50,
            cache_block_size: 100,
            pagination: true,
            overlay_hide_delay_ms: 100,
            frame_interval_ms: 16,
            min_height_px: 500,
            overlay_message: "Updating data...".to_string(),
        }
    }
}

impl GridSettings {
    pub fn overlay_hide_delay(&self) -> Duration {
        Duration::from_millis(self.overlay_hide_delay_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Series kinds supported by the chart bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Line,
}

/// Fixed series configuration of the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub series: SeriesKind,

    /// Category field of each datum
    pub x_key: String,

    /// Numeric field of each datum
    pub y_key: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            series: SeriesKind::Line,
            x_key: "month".to_string(),
            y_key: "count".to_string(),
        }
    }
}

/// Live connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketSettings {
    pub path: String,
    pub long_poll_fallback_ms: u64,

    /// Name of the meta anchor holding the authentication token
    pub token_anchor: String,
}

impl Default for SocketSettings {
    fn default() -> Self {
        Self {
            path: "/live".to_string(),
            long_poll_fallback_ms: 2500,
            token_anchor: "csrf-token".to_string(),
        }
    }
}

impl BridgeSettings {
    /// Parse settings from JSON; absent keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Save settings as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
