use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{config::NodeConfig, protocol::NodeEvent};
use tokio::sync::broadcast;

/// Capability set the controller depends on to talk to the remotely-hosted
/// node module. Control calls are fire-and-accept: `Ok` means the request
/// was taken, not that the underlying operation completed. Data asked for
/// through `request_*` arrives later on the event stream, or never.
#[async_trait]
pub trait NodeProxy: Send + Sync {
    /// One-time setup with the connection/configuration blob. Rejection is
    /// terminal for the current start attempt.
    async fn initialize(&self, config: &NodeConfig) -> Result<()>;

    /// Arms the channel that allows asynchronous events to be delivered at
    /// all; must succeed before any event can be observed.
    async fn register_event_callback(&self) -> Result<()>;

    /// Registers interest in one named event. Rejection (channel not armed,
    /// duplicate registration) is non-fatal to the start sequence.
    async fn subscribe(&self, event_name: &str) -> Result<()>;

    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;

    /// Asks for the current peer roster; the answer is delivered as a
    /// `connectedPeersResponse` event.
    async fn request_peers(&self) -> Result<()>;

    /// Asks for the current metrics snapshot; the answer is delivered as a
    /// `metricsResponse` event.
    async fn request_metrics(&self) -> Result<()>;

    /// Inbound event stream for this module.
    fn subscribe_events(&self) -> broadcast::Receiver<NodeEvent>;
}

/// Null proxy for wiring a controller when no node module is loaded; every
/// control call is rejected and no event is ever delivered.
pub struct MissingNodeProxy {
    events: broadcast::Sender<NodeEvent>,
}

impl MissingNodeProxy {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(1);
        Self { events }
    }
}

impl Default for MissingNodeProxy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeProxy for MissingNodeProxy {
    async fn initialize(&self, _config: &NodeConfig) -> Result<()> {
        Err(anyhow!("node module is unavailable"))
    }

    async fn register_event_callback(&self) -> Result<()> {
        Err(anyhow!("node module is unavailable"))
    }

    async fn subscribe(&self, event_name: &str) -> Result<()> {
        Err(anyhow!("node module is unavailable for '{event_name}'"))
    }

    async fn start(&self) -> Result<()> {
        Err(anyhow!("node module is unavailable"))
    }

    async fn stop(&self) -> Result<()> {
        Err(anyhow!("node module is unavailable"))
    }

    async fn request_peers(&self) -> Result<()> {
        Err(anyhow!("node module is unavailable"))
    }

    async fn request_metrics(&self) -> Result<()> {
        Err(anyhow!("node module is unavailable"))
    }

    fn subscribe_events(&self) -> broadcast::Receiver<NodeEvent> {
        self.events.subscribe()
    }
}
