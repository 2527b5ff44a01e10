pub mod resolve;
pub mod routes;
pub mod tabs;

use std::collections::HashMap;
use std::sync::Arc;

use rhtmx_pages::StateHandle;
use serde_json::Value;

/// State accessor built from `--state key=value` flags; later flags win
pub fn state_handle(entries: Vec<(String, Value)>) -> StateHandle {
    let state: HashMap<String, Value> = entries.into_iter().collect();
    Arc::new(state)
}
