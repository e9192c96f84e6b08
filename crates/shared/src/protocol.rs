use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Answer to a connected-peers request: payload[0] is a comma-separated
/// peer-id string, payload[1] an optional ISO timestamp.
pub const CONNECTED_PEERS_RESPONSE: &str = "connectedPeersResponse";

/// Answer to a metrics request: payload[0] is the metrics text (possibly
/// JSON), payload[1] an optional ISO timestamp.
pub const METRICS_RESPONSE: &str = "metricsResponse";

/// Named notification delivered asynchronously by the node module. The
/// payload is an ordered list of opaque values whose meaning depends on the
/// event name; deliveries are not correlated to any specific prior request
/// and may arrive late, repeatedly, or never.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEvent {
    pub name: String,
    pub payload: Vec<Value>,
}

impl NodeEvent {
    pub fn new(name: impl Into<String>, payload: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}
