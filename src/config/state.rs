// Application state module
// Immutable per-process state shared by every connection

use std::sync::Arc;

use super::types::Config;
use crate::routing::RouteTable;

/// Application state
///
/// Built once at startup and never mutated; connections hold it through `Arc`.
pub struct AppState {
    pub config: Config,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    pub fn new(config: &Config, routes: RouteTable) -> Self {
        Self {
            config: config.clone(),
            routes: Arc::new(routes),
        }
    }
}
