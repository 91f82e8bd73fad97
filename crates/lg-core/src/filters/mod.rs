//! Filter and sort state for one grid

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::ColumnId;

/// Filter definition for one column, opaque to the bridge
pub type FilterSpec = Value;

/// Active filters keyed by column, in the order the server sent them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState(IndexMap<ColumnId, FilterSpec>);

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<ColumnId>, spec: FilterSpec) {
        self.0.insert(column.into(), spec);
    }

    pub fn get(&self, column: &str) -> Option<&FilterSpec> {
        self.0.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnId, &FilterSpec)> {
        self.0.iter()
    }
}

impl FromIterator<(ColumnId, FilterSpec)> for FilterState {
    fn from_iter<T: IntoIterator<Item = (ColumnId, FilterSpec)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Default)]
struct HolderState {
    filters: FilterState,
    generation: u64,
}

/// Shared holder of the filters of one grid instance.
///
/// Filters are only ever replaced wholesale. Each replacement starts a new
/// generation, which lets the bridge tell replies built from older filters
/// apart from current ones.
#[derive(Debug, Clone, Default)]
pub struct FilterStateHolder {
    state: Arc<RwLock<HolderState>>,
}

impl FilterStateHolder {
    /// Create a holder with the initial filters of a freshly loaded grid
    pub fn new(filters: FilterState) -> Self {
        Self {
            state: Arc::new(RwLock::new(HolderState {
                filters,
                ..HolderState::default()
            })),
        }
    }

    /// Replace the filters and return the new generation
    pub fn replace(&self, filters: FilterState) -> u64 {
        let mut state = self.state.write();
        state.filters = filters;
        state.generation += 1;
        state.generation
    }

    /// Current filters together with their generation
    pub fn snapshot(&self) -> (FilterState, u64) {
        let state = self.state.read();
        (state.filters.clone(), state.generation)
    }

    pub fn filters(&self) -> FilterState {
        self.state.read().filters.clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }
}
