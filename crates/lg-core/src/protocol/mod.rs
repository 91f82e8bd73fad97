//! Row window protocol
//!
//! One `get_rows` request asks the server for a contiguous block of rows under
//! the given sort order and filters. The reply carries the rows and, when the
//! server knows it, the total row count.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BridgeError, Result};
use crate::filters::FilterState;

mod token;

pub use token::RequestToken;

/// Column identifier as used by column definitions and filters
pub type ColumnId = String;

/// A single row as delivered by the server
pub type Row = Value;

/// Sort direction of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One entry of the widget's sort model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub col_id: ColumnId,
    pub sort: SortDirection,
}

impl SortSpec {
    pub fn new(col_id: impl Into<ColumnId>, sort: SortDirection) -> Self {
        Self {
            col_id: col_id.into(),
            sort,
        }
    }
}

/// Request for one block of rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowWindowRequest {
    /// Local correlation token, never sent over the wire
    #[serde(skip)]
    pub token: RequestToken,

    /// First row of the block (inclusive)
    pub start_row: u64,

    /// Last row of the block (exclusive)
    pub end_row: u64,

    /// Sort order, highest priority first
    pub sort_model: Vec<SortSpec>,

    /// Filters in effect when the request was sent
    pub filters: FilterState,
}

impl RowWindowRequest {
    /// Build a request, rejecting empty or inverted windows
    pub fn new(
        token: RequestToken,
        start_row: u64,
        end_row: u64,
        sort_model: Vec<SortSpec>,
        filters: FilterState,
    ) -> Result<Self> {
        if start_row >= end_row {
            return Err(BridgeError::InvalidWindow {
                start: start_row,
                end: end_row,
            });
        }

        Ok(Self {
            token,
            start_row,
            end_row,
            sort_model,
            filters,
        })
    }

    /// Wire payload of the request
    pub fn to_payload(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Reply to a [`RowWindowRequest`], as loosely typed as the server sends it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowWindowReply {
    pub row_data: Option<Vec<Row>>,
    pub row_count: Option<u64>,
}

/// A validated block of rows ready for the widget
#[derive(Debug, Clone, PartialEq)]
pub struct RowBlock {
    pub rows: Vec<Row>,
    pub row_count: Option<u64>,
}

impl RowWindowReply {
    /// Read a reply from its wire form.
    ///
    /// Anything that is not an object, or whose `row_data` is not an array,
    /// yields a reply without rows.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let row_data = object
            .get("row_data")
            .and_then(|v| v.as_array())
            .cloned();

        let row_count = object.get("row_count").and_then(|v| v.as_u64());

        Self { row_data, row_count }
    }

    /// Whether the reply carries a row sequence
    pub fn is_valid(&self) -> bool {
        self.row_data.is_some()
    }

    /// Convert into a block, or `None` for a failure reply
    pub fn into_block(self) -> Option<RowBlock> {
        let rows = self.row_data?;
        Some(RowBlock {
            rows,
            row_count: self.row_count,
        })
    }
}
