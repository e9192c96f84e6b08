use serde_json::Value;
use shared::protocol::{NodeEvent, CONNECTED_PEERS_RESPONSE, METRICS_RESPONSE};
use tracing::{debug, warn};

use crate::timefmt;

/// Event names the controller registers for during startup, one handler per
/// name.
pub const CONSUMED_EVENTS: [&str; 2] = [CONNECTED_PEERS_RESPONSE, METRICS_RESPONSE];

/// Validated domain update produced from one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheUpdate {
    Peers {
        roster: Vec<String>,
        updated_at: Option<String>,
    },
    Metrics {
        rendered: String,
        updated_at: Option<String>,
    },
}

/// Routes a named event to its typed interpretation. Unknown names are
/// ignored so newer module versions may emit events this controller does not
/// understand yet; an empty payload is invalid and rejected outright. Never
/// fails: malformed content degrades to the raw value.
pub fn route(event: &NodeEvent) -> Option<CacheUpdate> {
    match event.name.as_str() {
        CONNECTED_PEERS_RESPONSE => {
            let (peers, updated_at) = validated_payload(event)?;
            Some(CacheUpdate::Peers {
                roster: parse_peer_roster(&peers),
                updated_at: updated_at.map(|raw| timefmt::normalize(&raw)),
            })
        }
        METRICS_RESPONSE => {
            let (metrics, updated_at) = validated_payload(event)?;
            Some(CacheUpdate::Metrics {
                rendered: render_metrics(&metrics),
                updated_at: updated_at.map(|raw| timefmt::normalize(&raw)),
            })
        }
        other => {
            debug!(event = other, "ignoring unknown event");
            None
        }
    }
}

/// Rejects empty payloads and coerces the first two positions to text.
fn validated_payload(event: &NodeEvent) -> Option<(String, Option<String>)> {
    let Some(first) = event.payload.first() else {
        warn!(event = %event.name, "event payload is empty; dropping");
        return None;
    };
    Some((value_text(first), event.payload.get(1).map(value_text)))
}

/// Text rendering of an opaque payload value: strings verbatim, everything
/// else in its JSON form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Splits a comma-separated peer-id list, trimming whitespace and dropping
/// empty entries. Duplicates and arrival order are preserved.
fn parse_peer_roster(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|peer| !peer.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pretty-prints metrics that parse as a JSON object; anything else passes
/// through verbatim.
fn render_metrics(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string())
        }
        _ => raw.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
