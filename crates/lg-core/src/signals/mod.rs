//! Server-pushed signals
//!
//! Signals arrive as an event name plus a JSON payload and are decoded into
//! typed variants before any hook sees them.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{BridgeError, Result};
use crate::filters::FilterState;

pub const LOAD_GRID: &str = "load_grid";
pub const UPDATE_GRID: &str = "update_grid";
pub const LOAD_CHART: &str = "load_chart";
pub const UPDATE_CHART: &str = "update_chart";

/// Column definition, passed through to the grid widget untouched
pub type ColumnDef = Value;

/// Full grid definition
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadGrid {
    #[serde(rename = "gridDefs", default)]
    pub column_defs: Vec<ColumnDef>,

    #[serde(default)]
    pub default_col_def: Option<Value>,

    /// `null` and a missing key both mean "no filters"
    #[serde(default)]
    pub filters: Option<FilterState>,
}

/// New filters for an existing grid
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateGrid {
    #[serde(default)]
    pub filters: Option<FilterState>,
}

/// Complete chart dataset
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChartData {
    pub data: Vec<Value>,
}

/// A decoded inbound signal
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    LoadGrid(LoadGrid),
    UpdateGrid(UpdateGrid),
    LoadChart(ChartData),
    UpdateChart(ChartData),
}

impl Signal {
    /// Decode a named signal and its payload
    pub fn decode(name: &str, payload: Value) -> Result<Self> {
        match name {
            LOAD_GRID => parse(name, payload).map(Signal::LoadGrid),
            UPDATE_GRID => parse(name, payload).map(Signal::UpdateGrid),
            LOAD_CHART => parse(name, payload).map(Signal::LoadChart),
            UPDATE_CHART => parse(name, payload).map(Signal::UpdateChart),
            other => Err(BridgeError::UnknownSignal(other.to_string())),
        }
    }

    /// Wire name of the signal
    pub fn name(&self) -> &'static str {
        match self {
            Signal::LoadGrid(_) => LOAD_GRID,
            Signal::UpdateGrid(_) => UPDATE_GRID,
            Signal::LoadChart(_) => LOAD_CHART,
            Signal::UpdateChart(_) => UPDATE_CHART,
        }
    }

    /// Whether the signal targets a grid hook (as opposed to a chart hook)
    pub fn is_grid(&self) -> bool {
        matches!(self, Signal::LoadGrid(_) | Signal::UpdateGrid(_))
    }
}

fn parse<T: DeserializeOwned>(name: &str, payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| BridgeError::MalformedSignal {
        signal: name.to_string(),
        reason: e.to_string(),
    })
}
