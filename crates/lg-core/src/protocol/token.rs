//! Request tokens

use std::fmt;

/// Identifies one row request issued by a bridge.
///
/// `generation` names the filter state the request was built from; `seq`
/// increases with every request the bridge sends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken {
    pub generation: u64,
    pub seq: u64,
}

impl RequestToken {
    pub fn new(generation: u64, seq: u64) -> Self {
        Self { generation, seq }
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}#{}", self.generation, self.seq)
    }
}
