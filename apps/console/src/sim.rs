//! In-process stand-in for the remote node module, used to exercise the
//! controller end-to-end without a live backend.

use std::{collections::HashSet, time::Duration};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use control_core::NodeProxy;
use serde_json::json;
use shared::{
    config::NodeConfig,
    protocol::{NodeEvent, CONNECTED_PEERS_RESPONSE, METRICS_RESPONSE},
};
use tokio::sync::{broadcast, Mutex};
use tracing::info;

const RESPONSE_DELAY: Duration = Duration::from_millis(50);

const SIM_PEERS: &str = "16Usim9kP3vGq1, 16Usim4tWx8aHn,16Usim7mRd2cVz";

struct SimState {
    initialized: bool,
    callback_armed: bool,
    running: bool,
    subscriptions: HashSet<String>,
    started_at: Option<chrono::DateTime<Utc>>,
}

pub struct SimulatedNodeProxy {
    events: broadcast::Sender<NodeEvent>,
    state: Mutex<SimState>,
}

impl SimulatedNodeProxy {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            events,
            state: Mutex::new(SimState {
                initialized: false,
                callback_armed: false,
                running: false,
                subscriptions: HashSet::new(),
                started_at: None,
            }),
        }
    }

    /// Delivers an event after the module's usual answer latency, as a real
    /// module would: out of band, never as a call return.
    fn emit_later(&self, event: NodeEvent) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(RESPONSE_DELAY).await;
            let _ = events.send(event);
        });
    }

    fn wire_timestamp() -> String {
        Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

impl Default for SimulatedNodeProxy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeProxy for SimulatedNodeProxy {
    async fn initialize(&self, config: &NodeConfig) -> Result<()> {
        let mut state = self.state.lock().await;
        state.initialized = true;
        info!(
            config = %serde_json::to_string(config).unwrap_or_default(),
            "simulated module initialized"
        );
        Ok(())
    }

    async fn register_event_callback(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.initialized {
            bail!("module is not initialized");
        }
        state.callback_armed = true;
        Ok(())
    }

    async fn subscribe(&self, event_name: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.callback_armed {
            bail!("event callback is not registered");
        }
        if !state.subscriptions.insert(event_name.to_string()) {
            bail!("duplicate subscription for '{event_name}'");
        }
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.initialized {
            bail!("module is not initialized");
        }
        state.running = true;
        state.started_at = Some(Utc::now());
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.running {
            bail!("module is not running");
        }
        state.running = false;
        state.started_at = None;
        Ok(())
    }

    async fn request_peers(&self) -> Result<()> {
        let state = self.state.lock().await;
        if !state.running {
            bail!("module is not running");
        }
        if state.subscriptions.contains(CONNECTED_PEERS_RESPONSE) {
            self.emit_later(NodeEvent::new(
                CONNECTED_PEERS_RESPONSE,
                vec![json!(SIM_PEERS), json!(Self::wire_timestamp())],
            ));
        }
        Ok(())
    }

    async fn request_metrics(&self) -> Result<()> {
        let state = self.state.lock().await;
        if !state.running {
            bail!("module is not running");
        }
        let uptime = state
            .started_at
            .map(|at| (Utc::now() - at).num_seconds())
            .unwrap_or(0);
        if state.subscriptions.contains(METRICS_RESPONSE) {
            let metrics = json!({
                "connectedPeers": 3,
                "messagesRelayed": 42,
                "uptimeSeconds": uptime,
            });
            self.emit_later(NodeEvent::new(
                METRICS_RESPONSE,
                vec![json!(metrics.to_string()), json!(Self::wire_timestamp())],
            ));
        }
        Ok(())
    }

    fn subscribe_events(&self) -> broadcast::Receiver<NodeEvent> {
        self.events.subscribe()
    }
}
