//! Live connection configuration
//!
//! The connection needs the page's authentication token. A page without the
//! token anchor cannot talk to the server at all, so its absence is fatal.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::error;

use crate::config::SocketSettings;
use crate::error::{BridgeError, Result};

/// Read access to the page's `<meta>` anchors
pub trait AnchorSource {
    /// Content of the meta anchor with the given name
    fn meta_content(&self, name: &str) -> Option<String>;
}

impl AnchorSource for HashMap<String, String> {
    fn meta_content(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Parameters used to open the live connection
#[derive(Debug, Clone, PartialEq)]
pub struct SocketConfig {
    pub path: String,
    pub long_poll_fallback_ms: u64,
    pub params: IndexMap<String, String>,
}

impl SocketConfig {
    /// Build the connection parameters from the page anchors
    pub fn from_anchors(anchors: &dyn AnchorSource, settings: &SocketSettings) -> Result<Self> {
        let Some(token) = anchors.meta_content(&settings.token_anchor) else {
            error!("No meta anchor named '{}' on the page", settings.token_anchor);
            return Err(BridgeError::MissingAnchor(format!(
                "meta[name='{}']",
                settings.token_anchor
            )));
        };

        let mut params = IndexMap::new();
        params.insert("_csrf_token".to_string(), token);

        Ok(Self {
            path: settings.path.clone(),
            long_poll_fallback_ms: settings.long_poll_fallback_ms,
            params,
        })
    }
}
